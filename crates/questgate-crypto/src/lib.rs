//! Hybrid request/response encryption for the Questgate transport client.
//!
//! Every request body is encrypted with a fresh AES-256-GCM session key;
//! the session key itself travels to the server wrapped with the server's
//! long-lived RSA public key (RSA-OAEP-SHA256). The scheme keeps asymmetric
//! operations cheap and bounded in size:
//! - AES-256-GCM for bulk payload encryption (random 12-byte IV per call)
//! - RSA-OAEP-SHA256 only ever wraps the 32 raw key bytes
//!
//! Wire format for sealed payloads: `base64(iv) ":" base64(ciphertext)`.
//! The delimiter cannot appear in base64 output, so no escaping is needed.
//!
//! Failure policy: every operation surfaces a typed [`CryptoError`]; nothing
//! in this crate silently substitutes plaintext or skips encryption.

mod envelope;
mod error;
mod keys;

pub use envelope::{open, seal, SealedPayload, PAYLOAD_DELIMITER};
pub use error::{CryptoError, CryptoResult};
pub use keys::{unwrap_session_key, ServerPublicKey, SessionKey, SESSION_KEY_SIZE};
