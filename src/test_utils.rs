//! Test utilities and shared configuration.
//!
//! Common helpers for unit tests and for downstream crates testing their
//! own session handling.

#[cfg(any(test, feature = "testing"))]
use crate::config::{CookieOptions, SessionConfig};
#[cfg(any(test, feature = "testing"))]
use crate::security::crypto::KeyRing;

/// Creates a standard configuration for testing purposes.
///
/// This configuration has:
/// - Two fixed keys (`primary-test-secret` seals, `retired-test-secret` still opens)
/// - Default cookie attributes
/// - A one hour TTL
#[cfg(any(test, feature = "testing"))]
#[must_use]
pub fn create_test_config() -> SessionConfig {
    SessionConfig::new(KeyRing::from_secrets([
        "primary-test-secret",
        "retired-test-secret",
    ]))
    .with_cookie(CookieOptions {
        max_age: 3600,
        ..Default::default()
    })
}
