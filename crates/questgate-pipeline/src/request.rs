//! Request descriptors and the retry counter.

use serde_json::Value;

/// A logical API call, before the pipeline transforms it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: reqwest::Method,
    /// Path relative to the API base URL (e.g. `/quests/42/complete`)
    pub path: String,
    /// Optional JSON body. Presence of a body is what triggers encryption.
    pub body: Option<Value>,
    /// Optional session identity attached as a header
    pub session_id: Option<String>,
}

impl ApiRequest {
    /// A bodyless GET. Sent in the clear.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::GET,
            path: path.into(),
            body: None,
            session_id: None,
        }
    }

    /// A POST carrying a JSON body. The body will be encrypted.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: reqwest::Method::POST,
            path: path.into(),
            body: Some(body),
            session_id: None,
        }
    }

    /// A PUT carrying a JSON body. The body will be encrypted.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: reqwest::Method::PUT,
            path: path.into(),
            body: Some(body),
            session_id: None,
        }
    }

    /// A bodyless DELETE. Sent in the clear.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::DELETE,
            path: path.into(),
            body: None,
            session_id: None,
        }
    }

    /// Attach a caller session id.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Explicit retry state carried alongside a call.
///
/// Replaces the mutable `_retry` flag on the request itself: the counter is
/// owned by the pipeline's send loop, and `max_attempts` caps how many
/// retries a single call may consume, regardless of how many further 401s
/// it receives.
#[derive(Debug, Clone, Copy)]
pub struct Attempt {
    retries_used: u32,
    max_retries: u32,
}

impl Attempt {
    /// A fresh counter allowing exactly one retry.
    pub fn new() -> Self {
        Self {
            retries_used: 0,
            max_retries: 1,
        }
    }

    /// Whether another retry is still allowed.
    pub fn can_retry(&self) -> bool {
        self.retries_used < self.max_retries
    }

    /// Consume one retry.
    pub fn record_retry(&mut self) {
        self.retries_used += 1;
    }
}

impl Default for Attempt {
    fn default() -> Self {
        Self::new()
    }
}
