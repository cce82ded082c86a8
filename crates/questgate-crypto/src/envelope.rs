//! Sealing and opening of request/response payloads.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::SessionKey;

/// Delimiter between the IV and ciphertext parts of a sealed payload.
/// `:` never appears in standard base64 output, so the parts need no escaping.
pub const PAYLOAD_DELIMITER: char = ':';

/// IV size for AES-256-GCM (12 bytes / 96 bits).
const IV_SIZE: usize = 12;

/// GCM authentication tag size (appended to the ciphertext).
const TAG_SIZE: usize = 16;

/// An encrypted payload: random IV plus ciphertext (tag included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl SealedPayload {
    /// Render as the transport form `base64(iv):base64(ciphertext)`.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            BASE64.encode(&self.iv),
            PAYLOAD_DELIMITER,
            BASE64.encode(&self.ciphertext)
        )
    }

    /// Parse the transport form back into IV and ciphertext.
    pub fn decode(encoded: &str) -> CryptoResult<Self> {
        let (iv_part, ct_part) = encoded.split_once(PAYLOAD_DELIMITER).ok_or_else(|| {
            CryptoError::MalformedPayload("missing iv:ciphertext delimiter".to_string())
        })?;

        let iv = BASE64
            .decode(iv_part)
            .map_err(|e| CryptoError::Base64Decode(e.to_string()))?;
        if iv.len() != IV_SIZE {
            return Err(CryptoError::MalformedPayload(format!(
                "iv must be {} bytes, got {}",
                IV_SIZE,
                iv.len()
            )));
        }

        let ciphertext = BASE64
            .decode(ct_part)
            .map_err(|e| CryptoError::Base64Decode(e.to_string()))?;
        if ciphertext.len() < TAG_SIZE {
            return Err(CryptoError::MalformedPayload(format!(
                "ciphertext must be at least {} bytes, got {}",
                TAG_SIZE,
                ciphertext.len()
            )));
        }

        Ok(Self { iv, ciphertext })
    }
}

/// Encrypt a plaintext payload with the given session key.
///
/// Generates a fresh random 12-byte IV per call; IVs are never reused.
pub fn seal(plaintext: &str, key: &SessionKey) -> CryptoResult<SealedPayload> {
    // 1. Fresh random IV for this call
    let mut iv = [0u8; IV_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);

    // 2. Encrypt with AES-256-GCM
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok(SealedPayload {
        iv: iv.to_vec(),
        ciphertext,
    })
}

/// Decrypt a sealed payload with the given session key.
///
/// Fails with [`CryptoError::DecryptionFailed`] when the key does not match
/// the IV/ciphertext pair — wrong key, corrupted data, or a key-slot race.
pub fn open(sealed: &SealedPayload, key: &SessionKey) -> CryptoResult<String> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&sealed.iv), sealed.ciphertext.as_slice())
        .map_err(|_| {
            CryptoError::DecryptionFailed("authentication tag mismatch".to_string())
        })?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
}
