//! Player state: sanity, inventory, flags, variables and navigation history

use crate::types::ids::{FlagName, ItemId, PassageId, StoryValue, VarName};
use crate::types::settings::GameSettings;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Psychological state of the player, always within `0..=100`
///
/// The only way to build or change a value is through clamping
/// constructors, so an out-of-range sanity cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Sanity(u8);

impl Sanity {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;

    pub fn full() -> Self {
        Self(Self::MAX)
    }

    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Apply a signed delta and clamp the result
    pub fn shifted(self, delta: i32) -> Self {
        Self::clamped(i64::from(self.0) + i64::from(delta))
    }
}

impl Default for Sanity {
    fn default() -> Self {
        Self::full()
    }
}

impl From<i64> for Sanity {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Sanity> for i64 {
    fn from(sanity: Sanity) -> Self {
        i64::from(sanity.0)
    }
}

impl std::fmt::Display for Sanity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable state of one game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub sanity: Sanity,
    #[serde(default)]
    pub inventory: BTreeSet<ItemId>,
    #[serde(default)]
    pub flags: BTreeMap<FlagName, bool>,
    #[serde(default)]
    pub variables: BTreeMap<VarName, StoryValue>,
    pub current_passage_id: PassageId,
    /// Previously visited passages, most recent last
    #[serde(default)]
    pub history: Vec<PassageId>,
    #[serde(default)]
    pub settings: GameSettings,
}

impl PlayerState {
    /// Fresh state positioned at `start`
    pub fn new(start: PassageId, sanity: Sanity) -> Self {
        Self {
            sanity,
            inventory: BTreeSet::new(),
            flags: BTreeMap::new(),
            variables: BTreeMap::new(),
            current_passage_id: start,
            history: Vec::new(),
            settings: GameSettings::default(),
        }
    }

    pub fn has_item(&self, item: &ItemId) -> bool {
        self.inventory.contains(item)
    }

    /// Current value of a flag; unset flags read as `false`
    pub fn flag(&self, name: &FlagName) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn variable(&self, name: &VarName) -> Option<&StoryValue> {
        self.variables.get(name)
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }
}
