//! File-backed storage backend.

use crate::{ClientStorage, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable storage persisted as a JSON object in a single file.
///
/// Writes go through a temp file followed by a rename, so a crash mid-write
/// never leaves a truncated store behind.
pub struct FileStorage {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) a file-backed store at the given path.
    pub fn open(path: PathBuf) -> StorageResult<Self> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| StorageError::Encoding(e.to_string()))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    fn persist(&self, data: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ClientStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        data.insert(key.to_string(), value.to_string());
        self.persist(&data)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self
            .data
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let removed = data.remove(key).is_some();
        if removed {
            self.persist(&data)?;
        }
        Ok(removed)
    }
}
