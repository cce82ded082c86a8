//! Configuration and shared utilities for the Questgate transport client.
//!
//! This crate provides:
//! - Client configuration with compile-time overridable defaults
//! - File system paths for durable client state
//! - Logging initialization built on `tracing-subscriber`

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_API_URL, DEFAULT_LOG_LEVEL, DEFAULT_SERVER_PUBLIC_KEY_PEM};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
