//! Configuration settings.
//!
//! Defines `SessionConfig`, the cookie attribute model and environment
//! variable loading logic.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::error::{Result, SessionError};
use crate::core::headers::{validate_cookie_domain, validate_cookie_name, validate_cookie_path};
use crate::security::crypto::KeyRing;

pub const DEFAULT_COOKIE_NAME: &str = "session";

/// One hundred years, in seconds.
pub const DEFAULT_MAX_AGE_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            other => Err(SessionError::Config(format!(
                "invalid SameSite value '{other}' (expected strict, lax or none)"
            ))),
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cookie attributes used when writing and reading the session cookie.
///
/// The cookie value itself is always the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    /// Cookie name.
    pub name: String,
    /// `Path` attribute.
    pub path: String,
    /// `Domain` attribute, omitted when `None`.
    pub domain: Option<String>,
    /// `Max-Age` attribute in seconds. Also the lifetime of the token.
    pub max_age: u64,
    /// `Secure` attribute.
    pub secure: bool,
    /// `HttpOnly` attribute.
    pub http_only: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            domain: None,
            max_age: DEFAULT_MAX_AGE_SECS,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieOptions {
    /// Checks that every attribute can be written as a `Set-Cookie` header.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidCookie` for an invalid name, path or
    /// domain, and `SessionError::Config` for a zero max-age.
    pub fn validate(&self) -> Result<()> {
        validate_cookie_name(&self.name)?;
        validate_cookie_path(&self.path)?;
        if let Some(domain) = &self.domain {
            validate_cookie_domain(domain)?;
        }
        if self.max_age == 0 {
            return Err(SessionError::Config(
                "cookie max-age must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Session configuration: the key ring plus cookie attributes.
///
/// Immutable once built. Share it behind an `Arc` across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Keys used to seal and open tokens.
    ///
    /// Tokens are sealed under the first key and opened with any of them.
    /// As long as two servers share at least one key, and the sealing key
    /// of each is known to the other, sessions move freely between them.
    pub keys: KeyRing,
    /// Cookie attributes. `CookieOptions::default()` unless overridden.
    pub cookie: CookieOptions,
}

impl SessionConfig {
    /// Creates a configuration with default cookie attributes.
    #[must_use]
    pub fn new(keys: impl Into<KeyRing>) -> Self {
        Self {
            keys: keys.into(),
            cookie: CookieOptions::default(),
        }
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: CookieOptions) -> Self {
        self.cookie = cookie;
        self
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub const fn ttl_secs(&self) -> u64 {
        self.cookie.max_age
    }

    /// Checks the key ring and cookie attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is configured or a cookie attribute is
    /// invalid.
    pub fn validate(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(SessionError::Config(
                "at least one session key is required".to_string(),
            ));
        }
        self.cookie.validate()
    }

    /// Loads configuration from environment variables.
    ///
    /// `SESSION_KEYS` is a comma-separated list of secrets; the first one
    /// seals new tokens. Cookie attributes fall back to
    /// `CookieOptions::default()`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if `SESSION_KEYS` is missing or empty,
    /// or a variable cannot be parsed, and `SessionError::InvalidCookie` if a
    /// cookie attribute is not valid cookie syntax.
    pub fn from_env() -> Result<Arc<Self>> {
        let defaults = CookieOptions::default();

        let secrets: Vec<String> = get_env("SESSION_KEYS")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let keys = KeyRing::from_secrets(&secrets);

        let cookie = CookieOptions {
            name: get_env_or("SESSION_COOKIE_NAME", &defaults.name),
            path: get_env_or("SESSION_COOKIE_PATH", &defaults.path),
            domain: env::var("SESSION_COOKIE_DOMAIN")
                .ok()
                .filter(|s| !s.is_empty()),
            max_age: get_env_u64_or("SESSION_MAX_AGE_SECS", defaults.max_age)?,
            secure: get_env_bool_or("SESSION_COOKIE_SECURE", defaults.secure)?,
            http_only: get_env_bool_or("SESSION_COOKIE_HTTP_ONLY", defaults.http_only)?,
            same_site: env::var("SESSION_COOKIE_SAME_SITE")
                .ok()
                .filter(|s| !s.is_empty())
                .map_or(Ok(defaults.same_site), |s| s.parse())?,
        };

        let config = Self { keys, cookie };
        config.validate()?;
        Ok(Arc::new(config))
    }
}

fn get_env(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SessionError::Config(format!("{key} must be set in environment")))
}

fn get_env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_bool_or(key: &str, default: bool) -> Result<bool> {
    let Ok(value) = env::var(key) else {
        return Ok(default);
    };
    match value.to_lowercase().as_str() {
        "" => Ok(default),
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SessionError::Config(format!(
            "{key} must be a boolean, got '{value}'"
        ))),
    }
}

fn get_env_u64_or(key: &str, default: u64) -> Result<u64> {
    match env::var(key).ok().filter(|s| !s.is_empty()) {
        Some(value) => value.trim().parse().map_err(|_| {
            SessionError::Config(format!("{key} must be a valid u64, got '{value}'"))
        }),
        None => Ok(default),
    }
}
