//! Errors from authentication operations.

use thiserror::Error;

/// Error type for authentication operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login rejected by the server
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Refresh rejected by the server (expired or revoked refresh token)
    #[error("Refresh failed: {0}")]
    RefreshFailed(String),

    /// Operation requires a session but none is held
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Access token payload could not be decoded
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Durable storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] questgate_storage::StorageError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
