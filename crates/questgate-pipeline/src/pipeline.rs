//! The request pipeline itself.

use crate::error::{PipelineError, PipelineResult};
use crate::request::{ApiRequest, Attempt};
use questgate_auth::CredentialManager;
use questgate_config::Config;
use questgate_crypto::{open, seal, SealedPayload, ServerPublicKey, SessionKey};
use questgate_storage::SessionKeyStore;
use std::sync::Arc;
use uuid::Uuid;

/// Header carrying the per-call correlation id. The server echoes requests
/// synchronously, so the client can correlate by its own id without the
/// server participating.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the caller's session identity, when one exists.
pub const SESSION_HEADER: &str = "x-session-id";

/// Query parameter carrying the RSA-wrapped session key.
pub const WRAPPED_KEY_PARAM: &str = "key";

enum SendOutcome {
    Success(serde_json::Value),
    Unauthorized,
}

/// Composes credentials, hybrid encryption and the session key store into
/// one transform per call, and owns the 401 retry policy.
pub struct RequestPipeline {
    http_client: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialManager>,
    server_key: ServerPublicKey,
    keys: Arc<dyn SessionKeyStore>,
}

impl RequestPipeline {
    /// Build a pipeline from configuration.
    ///
    /// Every call is bounded by the configured timeout; a call that never
    /// resolves must not pin its key store entry (the entry is evicted on
    /// failure, and TTL eviction covers the rest).
    pub fn new(
        config: &Config,
        credentials: Arc<CredentialManager>,
        keys: Arc<dyn SessionKeyStore>,
    ) -> PipelineResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let base_url = config
            .api_url()
            .map_err(|e| PipelineError::Config(e.to_string()))?
            .to_string();

        let server_key = ServerPublicKey::from_pem(&config.server_public_key_pem)?;

        Ok(Self {
            http_client,
            base_url,
            credentials,
            server_key,
            keys,
        })
    }

    /// Execute a logical call: transform, send, decrypt, and recover from a
    /// first 401 by refreshing and replaying exactly once.
    pub async fn execute(&self, request: ApiRequest) -> PipelineResult<serde_json::Value> {
        let mut attempt = Attempt::new();

        loop {
            match self.send_once(&request).await? {
                SendOutcome::Success(value) => return Ok(value),
                SendOutcome::Unauthorized => {
                    if !attempt.can_retry() {
                        tracing::warn!(path = %request.path, "401 after retry; ending session");
                        self.credentials.logout();
                        return Err(PipelineError::AuthFailure(
                            "unauthorized after retry".to_string(),
                        ));
                    }
                    attempt.record_retry();

                    tracing::debug!(path = %request.path, "401 received; refreshing credentials");
                    if let Err(e) = self.credentials.refresh().await {
                        // refresh() has already destroyed the session
                        return Err(PipelineError::AuthFailure(format!("refresh failed: {e}")));
                    }
                    // Loop: the replay re-runs the outbound transform, so the
                    // resent call carries the new token and a fresh session key.
                }
            }
        }
    }

    async fn send_once(&self, request: &ApiRequest) -> PipelineResult<SendOutcome> {
        let request_id = Uuid::new_v4().to_string();
        let url = self.request_url(&request.path);

        let mut builder = self
            .http_client
            .request(request.method.clone(), &url)
            .header(REQUEST_ID_HEADER, &request_id);

        match self.credentials.access_token() {
            Some(token) => builder = builder.bearer_auth(token),
            // Intentional: the server rejects, the client does not pre-judge.
            None => tracing::warn!(path = %request.path, "No access token; sending unauthenticated"),
        }

        if let Some(session_id) = &request.session_id {
            builder = builder.header(SESSION_HEADER, session_id);
        }

        let encrypted = request.body.is_some();
        if let Some(body) = &request.body {
            let session_key = SessionKey::generate();
            let sealed = seal(&body.to_string(), &session_key)?;
            let wrapped = self.server_key.wrap_key(&session_key)?;

            builder = builder
                .query(&[(WRAPPED_KEY_PARAM, wrapped.as_str())])
                .json(&serde_json::json!({ "data": sealed.encode() }));

            // The save must land before the send so the response side always
            // finds its key.
            self.keys.save(&request_id, &session_key)?;
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                self.discard_key(encrypted, &request_id);
                return Err(e.into());
            }
        };

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.discard_key(encrypted, &request_id);
            return Ok(SendOutcome::Unauthorized);
        }

        if !response.status().is_success() {
            let status = response.status();
            self.discard_key(encrypted, &request_id);
            return Err(PipelineError::Transport(format!(
                "server returned {status}"
            )));
        }

        let result = self.decode_response(response, encrypted, &request_id).await;
        self.discard_key(encrypted, &request_id);
        result.map(SendOutcome::Success)
    }

    async fn decode_response(
        &self,
        response: reqwest::Response,
        encrypted: bool,
        request_id: &str,
    ) -> PipelineResult<serde_json::Value> {
        let text = response.text().await.map_err(PipelineError::from)?;

        if !encrypted {
            return serde_json::from_str(&text).map_err(|e| {
                PipelineError::Transport(format!("malformed response JSON: {e}"))
            });
        }

        let session_key = self
            .keys
            .load(request_id)?
            .ok_or_else(|| PipelineError::MissingSessionKey(request_id.to_string()))?;

        // The sealed body may arrive bare or as a JSON-quoted string.
        let sealed_text = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(serde_json::Value::String(s)) => s,
            _ => text,
        };

        let sealed = SealedPayload::decode(sealed_text.trim())?;
        let plaintext = open(&sealed, &session_key)?;

        serde_json::from_str(&plaintext).map_err(|e| {
            PipelineError::Transport(format!("decrypted payload is not JSON: {e}"))
        })
    }

    fn discard_key(&self, encrypted: bool, request_id: &str) {
        if encrypted {
            if let Err(e) = self.keys.remove(request_id) {
                tracing::warn!(error = %e, "Failed to evict session key entry");
            }
        }
    }

    fn request_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
