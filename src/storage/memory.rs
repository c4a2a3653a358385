//! In-memory save store

use crate::storage::store::{PersistenceError, SaveStore};
use crate::storage::{SaveGame, decode, encode};
use crate::types::SessionKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Keeps encoded saves in a map, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    saves: Mutex<HashMap<SessionKey, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.saves
            .lock()
            .map(|saves| saves.contains_key(key))
            .unwrap_or(false)
    }

    fn poisoned() -> PersistenceError {
        PersistenceError::unavailable("memory store lock poisoned")
    }
}

#[async_trait]
impl SaveStore for MemoryStore {
    async fn save(&self, key: &SessionKey, save: &SaveGame) -> Result<(), PersistenceError> {
        let bytes = encode(save).map_err(|e| PersistenceError::serialization(&e))?;
        self.saves
            .lock()
            .map_err(|_| Self::poisoned())?
            .insert(key.clone(), bytes);
        Ok(())
    }

    async fn load(&self, key: &SessionKey) -> Result<Option<SaveGame>, PersistenceError> {
        let bytes = self
            .saves
            .lock()
            .map_err(|_| Self::poisoned())?
            .get(key)
            .cloned();
        bytes
            .map(|bytes| decode(&bytes).map_err(|e| PersistenceError::serialization(&e)))
            .transpose()
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), PersistenceError> {
        self.saves
            .lock()
            .map_err(|_| Self::poisoned())?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PassageId, PlayerState, Sanity, StoryId};

    #[tokio::test]
    async fn save_load_delete() {
        let store = MemoryStore::new();
        let key = SessionKey::from("slot");
        let save = SaveGame::new(
            StoryId::from("s"),
            PlayerState::new(PassageId::from("p"), Sanity::clamped(12)),
        );

        assert_eq!(store.load(&key).await.unwrap(), None);
        store.save(&key, &save).await.unwrap();
        assert!(store.contains(&key));
        assert_eq!(store.load(&key).await.unwrap(), Some(save));
        store.delete(&key).await.unwrap();
        assert_eq!(store.load(&key).await.unwrap(), None);
        store.delete(&key).await.unwrap();
    }
}
