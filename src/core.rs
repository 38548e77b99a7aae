//! Core session components.
//!
//! Contains the token codec and the HTTP cookie adapter built on top of it.

pub mod codec;
pub mod headers;
pub mod session;
