//! Lint module for story quality checking
//!
//! Validation already guarantees a story is structurally sound. Lint looks
//! for authoring mistakes that are legal but almost certainly unintended:
//! - Flow: unreachable passages, dead ends, endings with choices
//! - References: gates on items or flags the story can never provide

use crate::types::{ChoiceId, PassageId, Story};
use serde::{Deserialize, Serialize};

pub mod checks;

/// Lint severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LintLevel {
    /// Error: the story cannot be completed as written
    Error,
    /// Warning: should be reviewed
    Warning,
    /// Info: for your information
    Info,
}

/// A lint issue found in a story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintIssue {
    pub level: LintLevel,
    pub message: String,
    pub passage: PassageId,
    pub choice: Option<ChoiceId>,
    pub category: String,
}

/// Result of linting a story
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: LintIssue) {
        match issue.level {
            LintLevel::Error => self.error_count += 1,
            LintLevel::Warning => self.warning_count += 1,
            LintLevel::Info => self.info_count += 1,
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Lint a validated story
pub fn check(story: &Story) -> LintResult {
    let mut result = LintResult::new();
    checks::flow::check(story, &mut result);
    checks::references::check(story, &mut result);

    for issue in &result.issues {
        log::debug!("[Lint] {:?} {}: {}", issue.level, issue.passage, issue.message);
    }
    result
}
