//! Library definitions.
//!
//! Stores session data (such as a user ID) in a browser cookie or API token,
//! encrypted and authenticated with AES-256-GCM so clients can neither read
//! nor alter it. Nothing is kept on the server.
//!
//! Most callers use [`set_session`] and [`get_session`], which manage the
//! cookie directly. [`encode`] and [`decode`] do the same work for tokens
//! stored elsewhere, for example an API token configured by hand in a client
//! process and presented through [`get_bearer_token`].

pub mod config;
pub mod core;
pub mod security;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;
pub use config::{CookieOptions, Result, SameSite, SessionConfig, SessionError};
pub use crate::core::codec::{decode, decode_at, encode, encode_at};
pub use crate::core::headers::MAX_COOKIE_LEN;
pub use crate::core::session::{clear_session, get_bearer_token, get_session, set_session};
pub use security::crypto::{KeyRing, SessionKey, generate_secret};
