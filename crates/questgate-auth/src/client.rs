//! REST client for the platform's authentication endpoints.

use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};

/// Client for `POST /auth/login` and `POST /auth/refresh`.
#[derive(Clone)]
pub struct AuthClient {
    http_client: reqwest::Client,
    api_url: String,
}

/// Token pair returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer token
    pub access_token: String,
    /// Long-lived token used only against `/auth/refresh`
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Response from `/auth/refresh`. The refresh token is only present when the
/// server rotates it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AuthClient {
    /// Create a new auth client against the given API base URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    /// Create an auth client reusing an existing `reqwest::Client`.
    pub fn with_http_client(http_client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
        }
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/{}", self.api_url.trim_end_matches('/'), endpoint)
    }

    /// Exchange user credentials for a token pair.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<TokenPair> {
        let url = self.auth_url("login");
        tracing::debug!("Logging in via {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, "Login rejected");
            return Err(AuthError::LoginFailed(format!(
                "server returned {status}"
            )));
        }

        Ok(response.json().await?)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// A non-2xx answer here is terminal: the refresh token is expired or
    /// revoked and the session cannot be recovered locally.
    pub(crate) async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshResponse> {
        let url = self.auth_url("refresh");
        tracing::debug!("Refreshing access token via {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, "Refresh rejected");
            return Err(AuthError::RefreshFailed(format!(
                "server returned {status}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn auth_url_joins_cleanly() {
        let client = AuthClient::new("https://api.example.com/");
        assert_eq!(client.auth_url("login"), "https://api.example.com/auth/login");

        let client = AuthClient::new("https://api.example.com");
        assert_eq!(
            client.auth_url("refresh"),
            "https://api.example.com/auth/refresh"
        );
    }

    #[tokio::test]
    async fn login_returns_token_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({
                "email": "quester@example.com",
                "password": "hunter2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accessToken": "at-1",
                "refreshToken": "rt-1"
            })))
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        let pair = client.login("quester@example.com", "hunter2").await.unwrap();

        assert_eq!(pair.access_token, "at-1");
        assert_eq!(pair.refresh_token, "rt-1");
    }

    #[tokio::test]
    async fn login_rejection_maps_to_login_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        let result = client.login("quester@example.com", "wrong").await;

        assert!(matches!(result, Err(AuthError::LoginFailed(_))));
    }

    #[tokio::test]
    async fn refresh_returns_new_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(serde_json::json!({"refreshToken": "rt-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accessToken": "at-2"
            })))
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        let response = client.refresh("rt-1").await.unwrap();

        assert_eq!(response.access_token, "at-2");
        assert!(response.refresh_token.is_none());
    }

    #[tokio::test]
    async fn refresh_rejection_maps_to_refresh_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        let result = client.refresh("stale").await;

        assert!(matches!(result, Err(AuthError::RefreshFailed(_))));
    }
}
