//! Error types and result aliases.
//!
//! Defines the `SessionError` enumeration and common `Result` type.
//!
//! Callers should treat every decode-side variant as "unauthenticated". The
//! variants only exist to make logs useful.

use thiserror::Error;

/// Session encoding, decoding and transport errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session cookie or bearer token was present.
    #[error("session not found")]
    NotFound,

    /// Authentication failed under every configured key.
    ///
    /// Wrong key, corruption and tampering all end up here.
    #[error("invalid session token")]
    InvalidToken,

    /// The token authenticated but its embedded expiry has passed.
    #[error("session expired")]
    Expired,

    /// The plaintext did not match the requested payload type.
    #[error("session payload deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The payload could not be serialized.
    #[error("session payload encoding failed: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Sealing the envelope failed.
    #[error("session encryption failed: {0}")]
    Encryption(String),

    /// The formatted `Set-Cookie` value exceeds what browsers accept.
    #[error("session cookie too long: {len} bytes (max {max})")]
    TooLong { len: usize, max: usize },

    /// Cookie name, path or domain is not valid cookie syntax.
    #[error("invalid cookie: {0}")]
    InvalidCookie(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Returns `true` when no session was presented at all.
    ///
    /// A missing session is the normal state for a fresh visitor and is
    /// usually not worth logging.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Result type alias for `SessionError`.
pub type Result<T> = std::result::Result<T, SessionError>;
