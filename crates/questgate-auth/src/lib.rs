//! Credential management for the Questgate transport client.
//!
//! This crate provides:
//! - The REST client for the platform's `/auth/login` and `/auth/refresh`
//!   endpoints
//! - JWT claim decoding (payload only; the client never verifies signatures)
//! - `CredentialManager`: the token owner with single-flight refresh,
//!   durable persistence, and logout signaling

mod claims;
mod client;
mod error;
mod manager;

pub use claims::TokenClaims;
pub use client::{AuthClient, TokenPair};
pub use error::{AuthError, AuthResult};
pub use manager::{AuthEvent, AuthPhase, CredentialManager, Credentials};
