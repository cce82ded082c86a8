//! Logging initialization for the transport client.
//!
//! All client components log through `tracing`; this module wires up a
//! `tracing-subscriber` stack with env-filter support so `RUST_LOG` can
//! override the configured default at runtime.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging system for the client.
///
/// Sets up tracing with:
/// - Human-readable output on stderr (or JSON when `QUESTGATE_LOG_JSON=1`)
/// - Log level from RUST_LOG env var or the provided default
///
/// # Arguments
///
/// * `level` - Default log level (trace, debug, info, warn, error)
///
/// # Example
///
/// ```ignore
/// init_logging("info");
/// tracing::info!("Client started");
/// ```
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let json_output = std::env::var("QUESTGATE_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if json_output {
        let _ = fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_all_variants() {
        assert_eq!(parse_level("trace"), tracing::Level::TRACE);
        assert_eq!(parse_level("debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level("info"), tracing::Level::INFO);
        assert_eq!(parse_level("warn"), tracing::Level::WARN);
        assert_eq!(parse_level("warning"), tracing::Level::WARN);
        assert_eq!(parse_level("error"), tracing::Level::ERROR);
    }

    #[test]
    fn parse_level_case_insensitive() {
        assert_eq!(parse_level("TRACE"), tracing::Level::TRACE);
        assert_eq!(parse_level("Debug"), tracing::Level::DEBUG);
    }

    #[test]
    fn parse_level_unknown_defaults_to_info() {
        assert_eq!(parse_level(""), tracing::Level::INFO);
        assert_eq!(parse_level("verbose"), tracing::Level::INFO);
    }
}
