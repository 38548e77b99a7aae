//! Session key material.
//!
//! A `SessionKey` is a 256-bit master key. Per-token AES keys are derived
//! from it with HMAC-SHA256 over a random salt, so the master key itself
//! never touches the cipher.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::{Result, SessionError};

type HmacSha256 = Hmac<Sha256>;

pub const KEY_LEN: usize = 32;

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    master_key: [u8; KEY_LEN],
}

impl SessionKey {
    /// Creates a key by hashing an arbitrary secret string with SHA-256.
    ///
    /// The same secret always yields the same key, so servers sharing a
    /// secret can read each other's tokens.
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        let result = hasher.finalize();
        let mut master_key = [0u8; KEY_LEN];
        master_key.copy_from_slice(&result);
        Self { master_key }
    }

    #[must_use]
    pub const fn from_bytes(master_key: [u8; KEY_LEN]) -> Self {
        Self { master_key }
    }

    /// Generates a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            master_key: rand::rng().random(),
        }
    }

    /// Derives the per-token cipher key for `salt`.
    pub(crate) fn derive(&self, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.master_key)
            .map_err(|e| SessionError::Encryption(format!("key derivation failed: {e}")))?;
        mac.update(salt);
        let result = mac.finalize();
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&result.into_bytes());
        Ok(key)
    }

    /// Short, non-reversible identifier for logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.master_key);
        URL_SAFE_NO_PAD.encode(&digest[..6])
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.master_key[..].ct_eq(&other.master_key[..]).into()
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Generates a random secret suitable for `SESSION_KEYS`.
#[must_use]
pub fn generate_secret() -> String {
    let random_bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}
