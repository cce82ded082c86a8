//! JWT claim decoding.
//!
//! The client decodes the payload segment of the access token to surface
//! the user's role and expiry; signature verification stays server-side.

use crate::error::{AuthError, AuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

/// Claims decoded from an access token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id)
    #[serde(default)]
    pub sub: Option<String>,
    /// Platform role (e.g. student, mentor, admin)
    #[serde(default)]
    pub role: Option<String>,
    /// Expiry as a unix timestamp
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT without verifying the signature.
    pub fn decode(token: &str) -> AuthResult<Self> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next()) {
            (Some(_header), Some(payload)) => payload,
            _ => {
                return Err(AuthError::InvalidToken(
                    "token is not a three-segment JWT".to_string(),
                ))
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| AuthError::InvalidToken(format!("payload is not base64url: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::InvalidToken(format!("payload is not claims JSON: {e}")))
    }

    /// Whether the token has expired (unknown expiry counts as not expired).
    pub fn is_expired(&self) -> bool {
        match self.exp {
            Some(exp) => chrono::Utc::now().timestamp() >= exp,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn decode_full_claims() {
        let token = make_token(&serde_json::json!({
            "sub": "user-1",
            "role": "student",
            "exp": 4102444800i64
        }));

        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.role.as_deref(), Some("student"));
        assert!(!claims.is_expired());
    }

    #[test]
    fn decode_minimal_claims() {
        let token = make_token(&serde_json::json!({}));

        let claims = TokenClaims::decode(&token).unwrap();
        assert!(claims.sub.is_none());
        assert!(claims.role.is_none());
        assert!(!claims.is_expired());
    }

    #[test]
    fn decode_expired_token() {
        let token = make_token(&serde_json::json!({"exp": 1000}));

        let claims = TokenClaims::decode(&token).unwrap();
        assert!(claims.is_expired());
    }

    #[test]
    fn decode_rejects_non_jwt() {
        assert!(matches!(
            TokenClaims::decode("opaque-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn decode_rejects_bad_base64_payload() {
        assert!(matches!(
            TokenClaims::decode("header.!!!.sig"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn decode_rejects_non_json_payload() {
        let payload = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(matches!(
            TokenClaims::decode(&format!("h.{payload}.s")),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
