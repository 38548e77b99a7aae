//! Multi-key AES-GCM sealing.
//!
//! Sealed layout: `version | salt | nonce | ciphertext+tag`. The cipher key is
//! `HMAC-SHA256(master_key, salt)` and the version byte is bound as
//! associated data.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use tracing::trace;

use super::key::SessionKey;
use crate::config::{Result, SessionError};

pub const SEAL_VERSION: u8 = 1;

const VERSION_LEN: usize = 1;
const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Bytes added to the plaintext by [`KeyRing::seal`].
pub const SEAL_OVERHEAD: usize = VERSION_LEN + SALT_LEN + NONCE_LEN + TAG_LEN;

/// Ordered set of session keys.
///
/// The first key seals new tokens. Every key is tried, in order, when
/// opening one, so a retired key can stay in the ring until its tokens
/// age out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRing {
    keys: Vec<SessionKey>,
}

impl KeyRing {
    #[must_use]
    pub const fn new(keys: Vec<SessionKey>) -> Self {
        Self { keys }
    }

    /// Builds a ring by hashing each secret with [`SessionKey::from_secret`].
    pub fn from_secrets<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: secrets
                .into_iter()
                .map(|s| SessionKey::from_secret(s.as_ref()))
                .collect(),
        }
    }

    /// The key new tokens are sealed under.
    #[must_use]
    pub fn primary(&self) -> Option<&SessionKey> {
        self.keys.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionKey> {
        self.keys.iter()
    }

    /// Encrypts and authenticates `plaintext` under the primary key.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Encryption` if the ring is empty or the
    /// cipher fails.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let key = self
            .primary()
            .ok_or_else(|| SessionError::Encryption("no encryption key configured".to_string()))?;

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let derived_key = key.derive(&salt)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(derived_key.as_slice()));
        let ciphertext = cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad: &[SEAL_VERSION],
                },
            )
            .map_err(|e| SessionError::Encryption(e.to_string()))?;

        let mut combined = Vec::with_capacity(SEAL_OVERHEAD - TAG_LEN + ciphertext.len());
        combined.push(SEAL_VERSION);
        combined.extend_from_slice(&salt);
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(combined)
    }

    /// Decrypts `sealed` with the first key that authenticates it.
    ///
    /// Returns `None` for short input, an unknown version, or when no key
    /// matches. These cases are deliberately not distinguished.
    #[must_use]
    pub fn open(&self, sealed: &[u8]) -> Option<Vec<u8>> {
        if sealed.len() < SEAL_OVERHEAD || sealed[0] != SEAL_VERSION {
            return None;
        }

        let (salt, rest) = sealed[VERSION_LEN..].split_at(SALT_LEN);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.keys.iter().enumerate().find_map(|(index, key)| {
            let derived_key = key.derive(salt).ok()?;
            let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(derived_key.as_slice()));
            let plaintext = cipher
                .decrypt(
                    nonce,
                    Payload {
                        msg: ciphertext,
                        aad: &[SEAL_VERSION],
                    },
                )
                .ok()?;
            trace!(key_index = index, key = %key.fingerprint(), "Token opened");
            Some(plaintext)
        })
    }
}

impl From<Vec<SessionKey>> for KeyRing {
    fn from(keys: Vec<SessionKey>) -> Self {
        Self::new(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let ring = KeyRing::from_secrets(["super_secret_key_123"]);
        let plaintext = b"Hello, World!";

        let sealed = ring.seal(plaintext).expect("seal failed");
        let opened = ring.open(&sealed).expect("open failed");

        assert_eq!(plaintext.to_vec(), opened);
        assert_eq!(sealed.len(), plaintext.len() + SEAL_OVERHEAD);
    }

    #[test]
    fn test_unique_ciphertexts() {
        let ring = KeyRing::from_secrets(["secret"]);
        let enc1 = ring.seal(b"Data").unwrap();
        let enc2 = ring.seal(b"Data").unwrap();
        assert_ne!(enc1, enc2);
    }

    #[test]
    fn test_empty_ring() {
        let ring = KeyRing::default();
        assert!(matches!(
            ring.seal(b"data"),
            Err(SessionError::Encryption(_))
        ));
        assert!(ring.open(&[SEAL_VERSION; 128]).is_none());
    }

    #[test]
    fn test_open_with_any_key() {
        let old = KeyRing::from_secrets(["old"]);
        let sealed = old.seal(b"data").unwrap();

        let rotated = KeyRing::from_secrets(["new", "old"]);
        assert_eq!(rotated.open(&sealed).unwrap(), b"data");

        let unrelated = KeyRing::from_secrets(["new", "newer"]);
        assert!(unrelated.open(&sealed).is_none());
    }

    #[test]
    fn test_invalid_data() {
        let ring = KeyRing::from_secrets(["secret"]);
        assert!(ring.open(b"short").is_none());

        let mut sealed = ring.seal(b"data").unwrap();
        if let Some(last) = sealed.last_mut() {
            *last ^= 0xFF;
        }
        assert!(ring.open(&sealed).is_none());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let ring = KeyRing::from_secrets(["secret"]);
        let mut sealed = ring.seal(b"data").unwrap();
        sealed[0] = SEAL_VERSION + 1;
        assert!(ring.open(&sealed).is_none());
    }
}
