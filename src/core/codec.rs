//! Session token codec.
//!
//! A token is the base64url (unpadded) encoding of a sealed envelope:
//!
//! ```text
//! envelope = expires (u64, big-endian Unix seconds) || JSON payload
//! token    = base64url(KeyRing::seal(envelope))
//! ```
//!
//! The expiry sits inside the authenticated region, so it cannot be changed
//! without invalidating the token.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{Result, SessionConfig, SessionError};

const EXPIRY_LEN: usize = 8;

/// Plaintext structure sealed into a token.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Envelope {
    expires: u64,
    payload: Vec<u8>,
}

impl Envelope {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(EXPIRY_LEN + self.payload.len());
        bytes.extend_from_slice(&self.expires.to_be_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    fn from_bytes(mut data: Vec<u8>) -> Option<Self> {
        if data.len() < EXPIRY_LEN {
            return None;
        }
        let payload = data.split_off(EXPIRY_LEN);
        let expires = u64::from_be_bytes(data.try_into().ok()?);
        Some(Self { expires, payload })
    }

    const fn is_expired(&self, now: u64) -> bool {
        now > self.expires
    }
}

/// Current Unix time in seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Encodes `value` into a token that expires `config.ttl_secs()` from now.
///
/// Use this when the token travels somewhere other than a cookie, such as
/// a hand-configured API token. For cookies, see
/// [`set_session`](crate::core::session::set_session).
///
/// # Errors
///
/// Returns `SessionError::Encoding` if `value` cannot be serialized, and
/// `SessionError::Encryption` if no key is configured or sealing fails.
pub fn encode<T: Serialize + ?Sized>(value: &T, config: &SessionConfig) -> Result<String> {
    encode_at(value, config, unix_now())
}

/// Same as [`encode`], with an explicit current time in Unix seconds.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_at<T: Serialize + ?Sized>(
    value: &T,
    config: &SessionConfig,
    now: u64,
) -> Result<String> {
    let envelope = Envelope {
        expires: now.saturating_add(config.ttl_secs()),
        payload: serde_json::to_vec(value).map_err(SessionError::Encoding)?,
    };
    let sealed = config.keys.seal(&envelope.to_bytes())?;
    Ok(URL_SAFE_NO_PAD.encode(sealed))
}

/// Decodes a token produced by [`encode`].
///
/// # Errors
///
/// - `SessionError::InvalidToken` if the token is malformed or no configured
///   key authenticates it.
/// - `SessionError::Expired` if its embedded expiry has passed.
/// - `SessionError::Deserialization` if the payload does not fit `T`.
pub fn decode<T: DeserializeOwned>(token: &str, config: &SessionConfig) -> Result<T> {
    decode_at(token, config, unix_now())
}

/// Same as [`decode`], with an explicit current time in Unix seconds.
///
/// A token stays valid up to and including its expiry second.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_at<T: DeserializeOwned>(
    token: &str,
    config: &SessionConfig,
    now: u64,
) -> Result<T> {
    let Ok(sealed) = URL_SAFE_NO_PAD.decode(token) else {
        debug!(action = "DECODE", reason = "base64", "Session token rejected");
        return Err(SessionError::InvalidToken);
    };

    let Some(envelope) = config.keys.open(&sealed).and_then(Envelope::from_bytes) else {
        debug!(
            action = "DECODE",
            reason = "unauthenticated",
            keys = config.keys.len(),
            "Session token rejected"
        );
        return Err(SessionError::InvalidToken);
    };

    if envelope.is_expired(now) {
        debug!(
            action = "DECODE",
            reason = "expired",
            expires = envelope.expires,
            now,
            "Session token rejected"
        );
        return Err(SessionError::Expired);
    }

    serde_json::from_slice(&envelope.payload).map_err(SessionError::Deserialization)
}
