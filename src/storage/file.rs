//! File-system save store: one JSON file per session key

use crate::storage::store::{PersistenceError, SaveStore};
use crate::storage::{SaveGame, decode, encode};
use crate::types::SessionKey;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the save for `key`; characters outside `[A-Za-z0-9_-]` are
    /// replaced so a key can never escape the base directory
    pub fn save_path(&self, key: &SessionKey) -> PathBuf {
        let name: String = key
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{name}.save.json"))
    }
}

#[async_trait]
impl SaveStore for FileStore {
    async fn save(&self, key: &SessionKey, save: &SaveGame) -> Result<(), PersistenceError> {
        let path = self.save_path(key);

        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| PersistenceError::io(format!("Failed to create save directory: {e}")))?;

        let bytes = encode(save).map_err(|e| PersistenceError::serialization(&e))?;

        // Write beside the target and rename so a crash never leaves half a save
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(|e| {
            PersistenceError::io(format!("Failed to write save file {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            PersistenceError::io(format!("Failed to replace save file {}: {}", path.display(), e))
        })
    }

    async fn load(&self, key: &SessionKey) -> Result<Option<SaveGame>, PersistenceError> {
        let path = self.save_path(key);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PersistenceError::io(format!(
                    "Failed to read save file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        decode(&bytes)
            .map(Some)
            .map_err(|e| PersistenceError::serialization(&e))
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), PersistenceError> {
        let path = self.save_path(key);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::io(format!(
                "Failed to delete save file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
