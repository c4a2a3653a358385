//! Flow analysis: reachability and dead ends

use crate::lint::{LintIssue, LintLevel, LintResult};
use crate::types::{PassageId, Story};
use std::collections::{HashSet, VecDeque};

/// Check flow issues (unreachable passages, dead ends, endings with choices)
pub fn check(story: &Story, result: &mut LintResult) {
    check_unreachable_passages(story, result);
    check_dead_ends(story, result);
    check_endings(story, result);
}

/// Passages reachable from the start, ignoring gates
pub fn reachable_passages(story: &Story) -> HashSet<PassageId> {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::new();

    reachable.insert(story.start_passage_id().clone());
    queue.push_back(story.start_passage_id().clone());

    while let Some(id) = queue.pop_front() {
        let Some(passage) = story.passage(&id) else {
            continue;
        };
        for choice in &passage.choices {
            if reachable.insert(choice.next_passage_id.clone()) {
                queue.push_back(choice.next_passage_id.clone());
            }
        }
    }

    reachable
}

fn check_unreachable_passages(story: &Story, result: &mut LintResult) {
    let reachable = reachable_passages(story);

    for passage in story.passages() {
        if !reachable.contains(&passage.id) {
            result.add_issue(LintIssue {
                level: LintLevel::Warning,
                message: format!("Passage '{}' can never be reached", passage.id),
                passage: passage.id.clone(),
                choice: None,
                category: "flow".to_string(),
            });
        }
    }
}

fn check_dead_ends(story: &Story, result: &mut LintResult) {
    for passage in story.passages() {
        if passage.choices.is_empty() && !story.is_ending(&passage.id) {
            result.add_issue(LintIssue {
                level: LintLevel::Error,
                message: format!(
                    "Passage '{}' has no choices and is not an ending; the session would be stuck",
                    passage.id
                ),
                passage: passage.id.clone(),
                choice: None,
                category: "flow".to_string(),
            });
        }
    }
}

fn check_endings(story: &Story, result: &mut LintResult) {
    for ending in story.endings() {
        if let Some(passage) = story.passage(ending)
            && !passage.choices.is_empty()
        {
            result.add_issue(LintIssue {
                level: LintLevel::Info,
                message: format!(
                    "Ending '{}' has choices that can never be taken",
                    passage.id
                ),
                passage: passage.id.clone(),
                choice: None,
                category: "flow".to_string(),
            });
        }
    }
}
