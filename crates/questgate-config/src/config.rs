//! Configuration management for the transport client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default API base URL (can be overridden at compile time via QUESTGATE_API_URL env var).
pub const DEFAULT_API_URL: &str = match option_env!("QUESTGATE_API_URL") {
    Some(url) => url,
    None => "https://api.questgate.app",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default per-call network timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Long-lived server RSA public key (SPKI PEM), used only to wrap session keys.
///
/// The key is fixed for the lifetime of a client build; rotation would require
/// shipping a new build. Can be overridden at compile time via
/// QUESTGATE_SERVER_PUBLIC_KEY env var.
pub const DEFAULT_SERVER_PUBLIC_KEY_PEM: &str = match option_env!("QUESTGATE_SERVER_PUBLIC_KEY") {
    Some(pem) => pem,
    None => {
        "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAlog/WSWxq1h4JUs1mM83
ZDBRcJf9kIkqVWi3VrP7Mwook9gLIlgIG0i4qKUN9ObMk/sIjS4vYtOROaWiqcWV
q0FzBw0AT/yL0FR0T23OBOvWrOZG9QbktbQH4H1WCDwQFsMPp3ttwfyJpExMBZ2g
XPIaDxHW+JHLFdTirodEMVLcK3Uej5BtJCutQK83x4V/wB/ItTOmnr137Cq0nh7M
eFg4j5gMkCKIY/erR7ts33xeeHSTr1hpKqF9Nr6qDXJh/R16XgLK2GQapzjgmLY1
u/+V1K8mUMI4CsvI8XsQbWpxRQxmZ+5GjONt+VwdKFJj6bA22/E9sKziCNZ+0p9a
oQIDAQAB
-----END PUBLIC KEY-----"
    }
};

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Server RSA public key in SPKI PEM form.
    #[serde(default = "default_server_public_key")]
    pub server_public_key_pem: String,
    /// Per-call network timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_server_public_key() -> String {
    DEFAULT_SERVER_PUBLIC_KEY_PEM.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            server_public_key_pem: DEFAULT_SERVER_PUBLIC_KEY_PEM.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from a file, falling back to defaults.
    /// The server public key is compile-time only and always uses the
    /// built-in default, regardless of what's in the config file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        // Force compile-time value (never from config file)
        config.server_public_key_pem = DEFAULT_SERVER_PUBLIC_KEY_PEM.to_string();

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let config_path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    /// Only log_level can be overridden at runtime.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("QUESTGATE_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    /// Get the API base URL as a parsed URL.
    pub fn api_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_url).map_err(CoreError::from)
    }

    /// Get the per-call timeout as a `Duration`.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
