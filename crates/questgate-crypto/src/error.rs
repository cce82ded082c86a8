//! Errors from hybrid encryption operations.

use thiserror::Error;

/// Errors from session key and payload encryption operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Server public key could not be parsed
    #[error("Invalid server public key: {0}")]
    InvalidPublicKey(String),

    /// RSA-OAEP wrap of a session key failed
    #[error("Key wrap failed: {0}")]
    WrapFailed(String),

    /// RSA-OAEP unwrap of a session key failed
    #[error("Key unwrap failed: {0}")]
    UnwrapFailed(String),

    /// AES-GCM encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// AES-GCM decryption failed (wrong key, corrupted data, or key-slot race)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Sealed payload did not match the `iv:ciphertext` format
    #[error("Malformed sealed payload: {0}")]
    MalformedPayload(String),

    /// Base64 decoding failed
    #[error("Failed to decode base64: {0}")]
    Base64Decode(String),

    /// Key material had the wrong length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Decrypted payload was not valid UTF-8
    #[error("Invalid UTF-8 in decrypted payload")]
    InvalidUtf8,
}

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
