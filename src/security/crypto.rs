//! Cryptographic utilities.
//!
//! Provides session key material and the multi-key sealing used by the
//! token codec.

pub mod key;
pub mod keyring;

pub use key::{SessionKey, generate_secret};
pub use keyring::{KeyRing, SEAL_OVERHEAD, SEAL_VERSION};
