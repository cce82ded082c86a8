//! File system paths for durable client state.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths for the transport client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client state files (~/.questgate)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.questgate`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".questgate"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.questgate).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.questgate/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the durable storage file path (~/.questgate/storage.json).
    ///
    /// Holds the persisted token pair and the session key slot.
    pub fn storage_file(&self) -> PathBuf {
        self.base_dir.join("storage.json")
    }

    /// Get the logs directory (~/.questgate/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
