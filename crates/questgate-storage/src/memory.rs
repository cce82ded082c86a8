//! In-memory storage backend.

use crate::{ClientStorage, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Ephemeral in-memory storage.
///
/// Mainly for tests; state is lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| crate::StorageError::Backend(e.to_string()))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self
            .data
            .lock()
            .map_err(|e| crate::StorageError::Backend(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| crate::StorageError::Backend(e.to_string()))?;
        Ok(data.remove(key).is_some())
    }
}
