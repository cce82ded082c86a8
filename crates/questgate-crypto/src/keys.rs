//! Session key generation and RSA key wrapping.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};

/// Size of a raw AES-256 session key (32 bytes).
pub const SESSION_KEY_SIZE: usize = 32;

/// An ephemeral AES-256 session key, generated fresh per request.
///
/// Lives from generation until the matching response has been opened (or
/// until its store entry is overwritten). Serializes to base64 for the
/// durable key store.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; SESSION_KEY_SIZE]);

impl SessionKey {
    /// Generate a fresh random session key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.0
    }

    /// Encode the key as base64 for storage.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    /// Decode a key from its base64 storage form.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::Base64Decode(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Build a key from raw bytes, validating the length.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SESSION_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: SESSION_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; SESSION_KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs
        f.write_str("SessionKey(..)")
    }
}

/// The server's long-lived RSA public key, used only to wrap session keys.
///
/// Payload bytes are never RSA-encrypted directly; RSA-OAEP-SHA256 wraps the
/// 32 raw AES key bytes and nothing else.
#[derive(Debug, Clone)]
pub struct ServerPublicKey {
    key: RsaPublicKey,
}

impl ServerPublicKey {
    /// Import a public key from SPKI PEM.
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        let key = RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Wrap a session key with RSA-OAEP-SHA256.
    ///
    /// Returns the wrapped key base64-encoded, safe to place in a query
    /// parameter.
    pub fn wrap_key(&self, session_key: &SessionKey) -> CryptoResult<String> {
        let padding = Oaep::new::<Sha256>();
        let wrapped = self
            .key
            .encrypt(&mut rand::thread_rng(), padding, session_key.as_bytes())
            .map_err(|e| CryptoError::WrapFailed(e.to_string()))?;
        Ok(BASE64.encode(wrapped))
    }
}

/// Unwrap a base64-encoded wrapped session key with the RSA private key.
///
/// This is the server-side half of the wrap contract; the client never holds
/// the private key. Kept here so the wire contract is fully expressed and
/// testable.
pub fn unwrap_session_key(wrapped: &str, private_key: &RsaPrivateKey) -> CryptoResult<SessionKey> {
    let wrapped_bytes = BASE64
        .decode(wrapped)
        .map_err(|e| CryptoError::Base64Decode(e.to_string()))?;
    let padding = Oaep::new::<Sha256>();
    let raw = private_key
        .decrypt(padding, &wrapped_bytes)
        .map_err(|e| CryptoError::UnwrapFailed(e.to_string()))?;
    SessionKey::from_bytes(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::EncodePublicKey;

    fn test_keypair() -> (RsaPrivateKey, String) {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
        let pem = private
            .to_public_key()
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap();
        (private, pem)
    }

    #[test]
    fn session_key_generate_produces_different_keys() {
        let k1 = SessionKey::generate();
        let k2 = SessionKey::generate();
        assert_ne!(k1, k2);
    }

    #[test]
    fn session_key_base64_roundtrip() {
        let key = SessionKey::generate();
        let encoded = key.to_base64();
        let decoded = SessionKey::from_base64(&encoded).unwrap();
        assert_eq!(key, decoded);
    }

    #[test]
    fn session_key_from_bytes_wrong_length() {
        let result = SessionKey::from_bytes(&[1u8; 16]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        ));
    }

    #[test]
    fn session_key_from_invalid_base64() {
        let result = SessionKey::from_base64("not valid base64!!!");
        assert!(matches!(result, Err(CryptoError::Base64Decode(_))));
    }

    #[test]
    fn session_key_debug_redacts_material() {
        let key = SessionKey::generate();
        assert_eq!(format!("{:?}", key), "SessionKey(..)");
    }

    #[test]
    fn server_public_key_from_invalid_pem_fails() {
        let result = ServerPublicKey::from_pem("-----BEGIN PUBLIC KEY-----\nbogus\n-----END PUBLIC KEY-----");
        assert!(matches!(result, Err(CryptoError::InvalidPublicKey(_))));
    }

    #[test]
    fn wrap_unwrap_roundtrip() {
        let (private, pem) = test_keypair();
        let public = ServerPublicKey::from_pem(&pem).unwrap();

        let key = SessionKey::generate();
        let wrapped = public.wrap_key(&key).unwrap();
        let unwrapped = unwrap_session_key(&wrapped, &private).unwrap();

        assert_eq!(key, unwrapped);
    }

    #[test]
    fn wrap_output_is_base64() {
        let (_, pem) = test_keypair();
        let public = ServerPublicKey::from_pem(&pem).unwrap();

        let wrapped = public.wrap_key(&SessionKey::generate()).unwrap();
        assert!(BASE64.decode(&wrapped).is_ok());
        // RSA-2048 output is 256 bytes
        assert_eq!(BASE64.decode(&wrapped).unwrap().len(), 256);
    }

    #[test]
    fn wrap_is_randomized() {
        // OAEP padding is randomized, so wrapping the same key twice must
        // produce different ciphertexts.
        let (_, pem) = test_keypair();
        let public = ServerPublicKey::from_pem(&pem).unwrap();

        let key = SessionKey::generate();
        let w1 = public.wrap_key(&key).unwrap();
        let w2 = public.wrap_key(&key).unwrap();
        assert_ne!(w1, w2);
    }

    #[test]
    fn unwrap_with_wrong_private_key_fails() {
        let (_, pem) = test_keypair();
        let (other_private, _) = test_keypair();
        let public = ServerPublicKey::from_pem(&pem).unwrap();

        let wrapped = public.wrap_key(&SessionKey::generate()).unwrap();
        let result = unwrap_session_key(&wrapped, &other_private);
        assert!(matches!(result, Err(CryptoError::UnwrapFailed(_))));
    }

    #[test]
    fn unwrap_garbage_fails() {
        let (private, _) = test_keypair();
        let result = unwrap_session_key("!!!not base64!!!", &private);
        assert!(matches!(result, Err(CryptoError::Base64Decode(_))));
    }
}
