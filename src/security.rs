//! Security primitives.
//!
//! Key handling and authenticated encryption for session tokens.

pub mod crypto;
