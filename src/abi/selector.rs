//! Function selector and event topic calculation
//!
//! Hashing goes through the [`Keccak256`] trait so callers can supply their
//! own implementation (a hardware-backed hasher, a test double, a closure).
//! [`TinyKeccak`] is the default.

use crate::utils::crypto;

/// Injected keccak256 primitive. Implementations must be pure.
pub trait Keccak256: Send + Sync {
    fn keccak256(&self, data: &[u8]) -> [u8; 32];
}

/// Default hasher backed by `tiny-keccak`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TinyKeccak;

impl Keccak256 for TinyKeccak {
    fn keccak256(&self, data: &[u8]) -> [u8; 32] {
        crypto::keccak256(data)
    }
}

impl<F> Keccak256 for F
where
    F: Fn(&[u8]) -> [u8; 32] + Send + Sync,
{
    fn keccak256(&self, data: &[u8]) -> [u8; 32] {
        self(data)
    }
}

/// ABI selector calculator
pub struct AbiSelector;

impl AbiSelector {
    /// Calculate function selector from signature string
    pub fn selector_from_signature(signature: &str) -> [u8; 4] {
        Self::selector_with(&TinyKeccak, signature)
    }

    /// First 4 bytes of `keccak256(signature)` using the given hasher
    pub fn selector_with<H: Keccak256 + ?Sized>(hasher: &H, signature: &str) -> [u8; 4] {
        let hash = hasher.keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Calculate event topic from signature string
    pub fn topic_from_signature(signature: &str) -> [u8; 32] {
        Self::topic_with(&TinyKeccak, signature)
    }

    /// `keccak256(signature)` using the given hasher
    pub fn topic_with<H: Keccak256 + ?Sized>(hasher: &H, signature: &str) -> [u8; 32] {
        hasher.keccak256(signature.as_bytes())
    }

    /// Get selector as hex string (with 0x prefix)
    pub fn selector_hex(signature: &str) -> String {
        crypto::encode_hex(&Self::selector_from_signature(signature))
    }

    /// Get topic as hex string (with 0x prefix)
    pub fn topic_hex(signature: &str) -> String {
        crypto::encode_hex(&Self::topic_from_signature(signature))
    }
}

/// `function_selector(signature)` with the default hasher
pub fn function_selector(signature: &str) -> [u8; 4] {
    AbiSelector::selector_from_signature(signature)
}
