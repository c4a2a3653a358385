//! Reference checks: gates on items and flags nothing provides

use crate::lint::{LintIssue, LintLevel, LintResult};
use crate::types::{Effect, FlagName, ItemId, Story};
use std::collections::HashSet;

/// Check that every required item and flag value can be produced
pub fn check(story: &Story, result: &mut LintResult) {
    let mut granted_items: HashSet<&ItemId> = HashSet::new();
    let mut produced_flags: HashSet<(&FlagName, bool)> = HashSet::new();

    for passage in story.passages() {
        for effect in passage.choices.iter().flat_map(|c| &c.effects) {
            match effect {
                Effect::InventoryAdd { item } => {
                    granted_items.insert(item);
                }
                Effect::SetFlag { name, value } => {
                    produced_flags.insert((name, *value));
                }
                _ => {}
            }
        }
    }

    for passage in story.passages() {
        for choice in &passage.choices {
            for item in &choice.requires_items {
                if !granted_items.contains(item) {
                    result.add_issue(LintIssue {
                        level: LintLevel::Warning,
                        message: format!(
                            "Choice '{}' requires item '{}' that no effect grants",
                            choice.id, item
                        ),
                        passage: passage.id.clone(),
                        choice: Some(choice.id.clone()),
                        category: "references".to_string(),
                    });
                }
            }

            for (name, expected) in &choice.requires_flags {
                // Unset flags read as false
                let satisfiable = !*expected || produced_flags.contains(&(name, true));
                if !satisfiable {
                    result.add_issue(LintIssue {
                        level: LintLevel::Warning,
                        message: format!(
                            "Choice '{}' requires flag '{}' to be true but nothing sets it",
                            choice.id, name
                        ),
                        passage: passage.id.clone(),
                        choice: Some(choice.id.clone()),
                        category: "references".to_string(),
                    });
                }
            }
        }
    }
}
