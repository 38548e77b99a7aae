//! Configuration management.
//!
//! Builds the immutable session configuration, either in code or from
//! environment variables. A configuration is never mutated after
//! construction; key rotation means building a new one.

mod error;
mod settings;

pub use error::{Result, SessionError};
pub use settings::{
    CookieOptions, DEFAULT_COOKIE_NAME, DEFAULT_MAX_AGE_SECS, SameSite, SessionConfig,
};
