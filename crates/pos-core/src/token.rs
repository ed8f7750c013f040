//! # Reversible Id Tokens
//!
//! Wraps an integer row id in an opaque, tamper-evident string so admin links
//! (e.g. "delete this sale") never expose raw ids.
//!
//! ## Token Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   id = 42                                                               │
//! │     │                                                                   │
//! │     ▼  "42" (decimal UTF-8)                                             │
//! │   AES-256-GCM(key, nonce = 12 random bytes)                             │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │   base64url(ciphertext ‖ tag)  "."  base64url(nonce)                    │
//! │                                                                         │
//! │   e.g.  "q0Lk3n0b4Ff1nC2tQhY.Zr9xY2m5d0pQ1Jx3"                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A fresh nonce is drawn for every encode, so the same id yields a different
//! token each time. Tokens must not be compared for equality.
//!
//! The key is injected; this module never reads configuration.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

/// Separator between the ciphertext and nonce parts.
const SEPARATOR: char = '.';

// =============================================================================
// Errors
// =============================================================================

/// Why a token could not be produced or read back.
///
/// Every decode failure means the same thing to a caller: the link was
/// tampered with or is not one of ours.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Not exactly two `.`-separated parts.
    #[error("Token is malformed")]
    Malformed,

    /// A part is not valid URL-safe base64.
    #[error("Token has invalid encoding")]
    InvalidEncoding,

    /// Nonce part decoded to the wrong length.
    #[error("Token has an invalid nonce")]
    InvalidNonce,

    /// Authentication tag did not verify (wrong key or modified ciphertext).
    #[error("Token could not be decrypted")]
    Decryption,

    /// Decrypted payload is not a decimal id.
    #[error("Token payload is not a valid id")]
    InvalidPayload,

    /// Encryption failed. Not expected with a valid key.
    #[error("Token could not be encrypted")]
    Encryption,
}

// =============================================================================
// Codec
// =============================================================================

/// Encrypts and decrypts ids with a process-wide key.
#[derive(Clone)]
pub struct TokenCodec {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Builds a codec from a raw 256-bit key.
    pub fn new(key: [u8; 32]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(&key);
        TokenCodec {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Derives the key as SHA-256 of the configured secret.
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        TokenCodec::new(key)
    }

    /// Encodes an id into a fresh token.
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::token::TokenCodec;
    ///
    /// let codec = TokenCodec::from_secret("an example secret that is long enough");
    /// let token = codec.encode(42).unwrap();
    /// assert_eq!(codec.decode(&token).unwrap(), 42);
    /// ```
    pub fn encode(&self, id: i64) -> Result<String, TokenError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, id.to_string().as_bytes())
            .map_err(|_| TokenError::Encryption)?;

        Ok(format!(
            "{}{}{}",
            URL_SAFE_NO_PAD.encode(ciphertext),
            SEPARATOR,
            URL_SAFE_NO_PAD.encode(nonce_bytes)
        ))
    }

    /// Decodes a token back into the id it was created for.
    pub fn decode(&self, token: &str) -> Result<i64, TokenError> {
        let mut parts = token.trim().split(SEPARATOR);
        let (ciphertext, nonce) = match (parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(n), None) if !c.is_empty() && !n.is_empty() => (c, n),
            _ => return Err(TokenError::Malformed),
        };

        let ciphertext = URL_SAFE_NO_PAD
            .decode(ciphertext)
            .map_err(|_| TokenError::InvalidEncoding)?;
        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(nonce)
            .map_err(|_| TokenError::InvalidEncoding)?;

        if nonce_bytes.len() != NONCE_LEN {
            return Err(TokenError::InvalidNonce);
        }

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| TokenError::Decryption)?;

        std::str::from_utf8(&plaintext)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(TokenError::InvalidPayload)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::from_secret("test-secret-test-secret-test-secret")
    }

    #[test]
    fn test_decode_returns_encoded_id() {
        let codec = codec();
        for id in [1_i64, 42, 9_007_199_254_740_993] {
            let token = codec.encode(id).unwrap();
            assert_eq!(codec.decode(&token).unwrap(), id);
        }
    }

    #[test]
    fn test_tokens_are_url_safe_and_randomized() {
        let codec = codec();
        let a = codec.encode(7).unwrap();
        let b = codec.encode(7).unwrap();

        assert_ne!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'));
        assert_eq!(a.matches('.').count(), 1);
    }

    #[test]
    fn test_flipped_byte_fails_authentication() {
        let codec = codec();
        let token = codec.encode(42).unwrap();
        let (ct, nonce) = token.split_once('.').unwrap();

        let mut bytes = URL_SAFE_NO_PAD.decode(ct).unwrap();
        bytes[0] ^= 0x01;
        let tampered = format!("{}.{}", URL_SAFE_NO_PAD.encode(bytes), nonce);

        assert_eq!(codec.decode(&tampered), Err(TokenError::Decryption));
    }

    #[test]
    fn test_wrong_key_fails() {
        let token = codec().encode(42).unwrap();
        let other = TokenCodec::from_secret("a-completely-different-secret-value");
        assert_eq!(other.decode(&token), Err(TokenError::Decryption));
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = codec();
        assert_eq!(codec.decode(""), Err(TokenError::Malformed));
        assert_eq!(codec.decode("abc"), Err(TokenError::Malformed));
        assert_eq!(codec.decode("a.b.c"), Err(TokenError::Malformed));
        assert_eq!(codec.decode("abc."), Err(TokenError::Malformed));
        assert_eq!(codec.decode("ab$c.AAAA"), Err(TokenError::InvalidEncoding));
        assert_eq!(codec.decode("AAAA.AAAA"), Err(TokenError::InvalidNonce));
    }

    #[test]
    fn test_non_numeric_payload_rejected() {
        let codec = codec();
        let nonce_bytes = [3u8; NONCE_LEN];
        let ct = codec
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), b"not-a-number".as_ref())
            .unwrap();
        let token = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(ct),
            URL_SAFE_NO_PAD.encode(nonce_bytes)
        );

        assert_eq!(codec.decode(&token), Err(TokenError::InvalidPayload));
    }
}
