//! Utilities Module
//!
//! Hashing, hex and logging helpers used across the crate.

pub mod crypto;
pub mod logging;

pub use crypto::*;
