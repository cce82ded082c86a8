//! Storage key constants.

/// Storage keys used by the transport layer
pub struct StorageKeys;

impl StorageKeys {
    /// Access token (plain string)
    pub const ACCESS_TOKEN: &'static str = "access_token";

    /// Refresh token (plain string)
    pub const REFRESH_TOKEN: &'static str = "refresh_token";

    /// Single session key slot (base64-serialized AES key)
    pub const SESSION_KEY: &'static str = "session_key";
}
