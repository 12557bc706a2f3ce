//! Authenticated, time-bound link tokens.
//!
//! A token seals a storage path together with the time it was issued. The
//! layout before base64 encoding is:
//!
//! ```text
//! version (1) || issued_at (i64, big-endian seconds) || nonce (12) || ciphertext + tag
//! ```
//!
//! The version byte and timestamp are authenticated as associated data, so
//! neither can be altered without invalidating the tag. Validity is checked
//! against a TTL supplied by the caller at open time, which means a tier's
//! current expiration applies to every outstanding token.

use std::fmt;
use std::time::Duration;

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};

use crate::AppError;

const TOKEN_VERSION: u8 = 1;
const HEADER_LEN: usize = 1 + 8;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Tokens issued further in the future than this are rejected outright.
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// A token could not be accepted. The reason is kept for logs only; callers
/// must treat every rejection the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("link token rejected")]
pub struct TokenError {
    reason: &'static str,
}

impl TokenError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    pub fn expired() -> Self {
        Self::new("expired")
    }

    pub fn no_ttl() -> Self {
        Self::new("tier has no expiration time")
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

/// Seals and opens link tokens with a process-wide AES-256-GCM key.
#[derive(Clone)]
pub struct TokenCodec {
    cipher: Aes256Gcm,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec from a raw 32-byte key.
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, AppError> {
        if key_bytes.len() != 32 {
            return Err(AppError::Config(
                "Link token key must be 32 bytes (256 bits)".to_string(),
            ));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Create a codec from a standard base64 encoded 32-byte key, as found in `LINK_TOKEN_KEY`.
    pub fn from_base64_key(encoded: &str) -> Result<Self, AppError> {
        let key_bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::Config(format!("Failed to decode link token key: {}", e)))?;

        Self::from_key_bytes(&key_bytes)
    }

    /// Seal `referent` into a URL-safe token stamped with `now`.
    pub fn seal(&self, referent: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let header = encode_header(now.timestamp());
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: referent.as_bytes(),
                    aad: &header,
                },
            )
            .map_err(|e| AppError::Internal(format!("Token encryption failed: {}", e)))?;

        let mut combined = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&header);
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);

        Ok(general_purpose::URL_SAFE_NO_PAD.encode(&combined))
    }

    /// Authenticate `token` and return its referent if it is younger than `ttl` at `now`.
    ///
    /// The boundary is exclusive: a token is valid while `now - issued_at < ttl`.
    pub fn open(&self, token: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, TokenError> {
        let combined = general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| TokenError::new("not valid base64"))?;

        if combined.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
            return Err(TokenError::new("too short"));
        }
        if combined[0] != TOKEN_VERSION {
            return Err(TokenError::new("unsupported version"));
        }

        let (header, rest) = combined.split_at(HEADER_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: header,
                },
            )
            .map_err(|_| TokenError::new("authentication failed"))?;

        let mut stamp = [0u8; 8];
        stamp.copy_from_slice(&header[1..HEADER_LEN]);
        let issued_at = i64::from_be_bytes(stamp);

        let elapsed = now.timestamp().saturating_sub(issued_at);
        if elapsed < -MAX_CLOCK_SKEW_SECS {
            return Err(TokenError::new("issued in the future"));
        }
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        if elapsed >= ttl_secs {
            return Err(TokenError::expired());
        }

        String::from_utf8(plaintext).map_err(|_| TokenError::new("referent is not UTF-8"))
    }
}

fn encode_header(issued_at: i64) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0] = TOKEN_VERSION;
    header[1..].copy_from_slice(&issued_at.to_be_bytes());
    header
}
