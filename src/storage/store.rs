//! Persistence contract consumed by the narrative controller

use crate::storage::SaveGame;
use crate::types::SessionKey;
use async_trait::async_trait;

/// Storage backend for sessions
///
/// Implementations may be slow; the controller only awaits them from
/// explicit save/restore calls and the background save worker.
#[async_trait]
pub trait SaveStore: Send + Sync {
    /// Persist `save` under `key`, replacing any previous save
    async fn save(&self, key: &SessionKey, save: &SaveGame) -> Result<(), PersistenceError>;

    /// Load the save stored under `key`, `None` if there is none
    async fn load(&self, key: &SessionKey) -> Result<Option<SaveGame>, PersistenceError>;

    /// Remove the save stored under `key`; removing nothing is not an error
    async fn delete(&self, key: &SessionKey) -> Result<(), PersistenceError>;
}

/// Persistence failures; never fatal to a session
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {message}")]
    Io { message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("incompatible save: {reason}")]
    IncompatibleSave { reason: String },
}

impl PersistenceError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn serialization(error: &anyhow::Error) -> Self {
        Self::Serialization {
            message: format!("{error:#}"),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn incompatible(reason: impl Into<String>) -> Self {
        Self::IncompatibleSave {
            reason: reason.into(),
        }
    }
}
