//! Durable client storage for the Questgate transport layer.
//!
//! This crate provides:
//! - A `ClientStorage` trait for persisted string key/value state
//! - `MemoryStorage` (ephemeral, for tests) and `FileStorage` (JSON file)
//! - The session key stores used by the request pipeline: the observed
//!   single-slot design and the per-request correlated map that replaces it

mod file;
mod keys;
mod keystore;
mod memory;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use keystore::{CorrelatedKeyStore, SessionKeyStore, SlotKeyStore, DEFAULT_KEY_TTL};
pub use memory::MemoryStorage;
pub use traits::ClientStorage;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific storage error
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
