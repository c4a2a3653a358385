//! Choice gate evaluator
//!
//! Locked choices are never hidden: every authored choice is visible and
//! carries the first unmet requirement so the UI can telegraph it.

use crate::types::{Choice, FlagName, ItemId, PlayerState};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// First requirement a choice failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockReason {
    SanityTooLow { required: i64, current: u8 },
    SanityTooHigh { allowed: i64, current: u8 },
    MissingItems { missing: BTreeSet<ItemId> },
    /// Flags whose current value differs from the expected one
    ConditionsNotMet { unmet: BTreeMap<FlagName, bool> },
}

impl BlockReason {
    pub fn code(&self) -> &'static str {
        match self {
            BlockReason::SanityTooLow { .. } => "SANITY_TOO_LOW",
            BlockReason::SanityTooHigh { .. } => "SANITY_TOO_HIGH",
            BlockReason::MissingItems { .. } => "MISSING_ITEMS",
            BlockReason::ConditionsNotMet { .. } => "CONDITIONS_NOT_MET",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::SanityTooLow { required, current } => {
                write!(f, "requires sanity {required} (current {current})")
            }
            BlockReason::SanityTooHigh { allowed, current } => {
                write!(f, "requires sanity at most {allowed} (current {current})")
            }
            BlockReason::MissingItems { missing } => {
                let names: Vec<&str> = missing.iter().map(ItemId::as_str).collect();
                write!(f, "requires {}", names.join(", "))
            }
            BlockReason::ConditionsNotMet { .. } => f.write_str("conditions not met"),
        }
    }
}

/// Result of gating one choice against one state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    pub visible: bool,
    pub selectable: bool,
    pub block_reason: Option<BlockReason>,
}

impl GateResult {
    fn open() -> Self {
        Self {
            visible: true,
            selectable: true,
            block_reason: None,
        }
    }

    fn blocked(reason: BlockReason) -> Self {
        Self {
            visible: true,
            selectable: false,
            block_reason: Some(reason),
        }
    }
}

/// Decide whether `choice` can be taken in `state`
///
/// Rules run in a fixed order (minimum sanity, maximum sanity, items,
/// flags); the first failure is reported. Unset flags count as `false`.
pub fn evaluate(choice: &Choice, state: &PlayerState) -> GateResult {
    let current = state.sanity.value();

    if let Some(required) = choice.min_sanity
        && i64::from(current) < required
    {
        return GateResult::blocked(BlockReason::SanityTooLow { required, current });
    }

    if let Some(allowed) = choice.max_sanity
        && i64::from(current) > allowed
    {
        return GateResult::blocked(BlockReason::SanityTooHigh { allowed, current });
    }

    let missing: BTreeSet<ItemId> = choice
        .requires_items
        .iter()
        .filter(|item| !state.has_item(item))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return GateResult::blocked(BlockReason::MissingItems { missing });
    }

    let unmet: BTreeMap<FlagName, bool> = choice
        .requires_flags
        .iter()
        .filter(|(name, expected)| state.flag(name) != **expected)
        .map(|(name, expected)| (name.clone(), *expected))
        .collect();
    if !unmet.is_empty() {
        return GateResult::blocked(BlockReason::ConditionsNotMet { unmet });
    }

    GateResult::open()
}
