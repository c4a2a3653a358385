//! Storage module for saving and loading sessions
//!
//! The engine depends only on the [`SaveStore`] contract. Sessions are
//! written as a [`SaveGame`] envelope using JSON serialization.

use crate::types::{PlayerState, StoryId};
use serde::{Deserialize, Serialize};

pub mod file;
pub mod memory;
pub mod store;
pub mod worker;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{PersistenceError, SaveStore};
pub use worker::SaveWorker;

/// Format version written into every save
pub const SAVE_VERSION: u32 = 1;

/// A persisted session: the story it belongs to and the player state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    pub story_id: StoryId,
    pub state: PlayerState,
}

impl SaveGame {
    pub fn new(story_id: StoryId, state: PlayerState) -> Self {
        Self {
            version: SAVE_VERSION,
            story_id,
            state,
        }
    }
}

/// Encode a save to bytes
pub fn encode(save: &SaveGame) -> anyhow::Result<Vec<u8>> {
    let json = serde_json::to_string_pretty(save)?;
    Ok(json.into_bytes())
}

/// Decode a save from bytes
pub fn decode(bytes: &[u8]) -> anyhow::Result<SaveGame> {
    let json = std::str::from_utf8(bytes)?;
    let save = serde_json::from_str(json)?;
    Ok(save)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlagName, ItemId, PassageId, Sanity, SettingUpdate, StoryValue, VarName};

    #[test]
    fn encode_then_decode_restores_save() {
        let mut state = PlayerState::new(PassageId::from("cellar"), Sanity::clamped(37));
        state.inventory.insert(ItemId::from("lantern"));
        state.flags.insert(FlagName::from("heard_voice"), true);
        state
            .variables
            .insert(VarName::from("name"), StoryValue::from("Eve"));
        state
            .variables
            .insert(VarName::from("visits"), StoryValue::from(3_i64));
        state.history = vec![PassageId::from("gate"), PassageId::from("hall")];
        state.settings.apply(SettingUpdate::Muted(true));
        let original = SaveGame::new(StoryId::from("edens-hollow"), state);

        let bytes = encode(&original).unwrap();
        let restored = decode(&bytes).unwrap();

        assert_eq!(restored, original);
    }

    #[test]
    fn decode_invalid_data_returns_error() {
        assert!(decode(b"invalid json data").is_err());
        assert!(decode(&[0xff, 0xfe]).is_err());
    }
}
