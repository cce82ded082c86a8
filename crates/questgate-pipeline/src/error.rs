//! Errors surfaced by the request pipeline.
//!
//! The taxonomy matters to callers: "your session expired" (re-login),
//! "the payload was corrupted" (fatal) and "the network is down" (retry at
//! the caller's discretion) must stay distinguishable, so the pipeline never
//! masks one class as another.

use thiserror::Error;

/// Error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Cryptographic failure. Fatal to the call; never retried.
    #[error("Crypto failure: {0}")]
    Crypto(#[from] questgate_crypto::CryptoError),

    /// 401 after the one allowed retry, or the refresh itself failed.
    /// The session has been destroyed.
    #[error("Authentication failure: {0}")]
    AuthFailure(String),

    /// An encrypted response arrived but no session key was found for the
    /// call. Raw ciphertext is never handed to the caller.
    #[error("No session key for request {0}")]
    MissingSessionKey(String),

    /// Network failure, timeout, or malformed response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Key store failure
    #[error("Key store error: {0}")]
    KeyStore(#[from] questgate_storage::StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PipelineError::Transport(format!("request timed out: {e}"))
        } else {
            PipelineError::Transport(e.to_string())
        }
    }
}
