//! Hashing and hex helpers
//!
//! The codec itself only needs keccak256 through the [`Keccak256`] seam in
//! `abi::selector`; these free functions back the default implementation
//! and the textual value formats (checksummed addresses, `0x` hex).
//!
//! [`Keccak256`]: crate::abi::selector::Keccak256

use tiny_keccak::{Hasher, Keccak};

use crate::error::{AbiError, AbiResult};

/// Keccak256 hash (the pre-standard SHA-3 variant Ethereum uses)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Convert raw address bytes to an EIP-55 checksummed address
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::from("0x");
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() || nibble < 8 {
            result.push(ch);
        } else {
            result.push(ch.to_ascii_uppercase());
        }
    }

    result
}

/// Strip an optional `0x`/`0X` prefix
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode hex text with or without a `0x` prefix
pub fn decode_hex(s: &str) -> AbiResult<Vec<u8>> {
    hex::decode(strip_hex_prefix(s.trim())).map_err(AbiError::from)
}

/// Encode bytes as `0x`-prefixed lowercase hex
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a 20-byte address from hex text (checksum is not enforced)
pub fn parse_address(s: &str) -> AbiResult<[u8; 20]> {
    let bytes = decode_hex(s)?;
    if bytes.len() != 20 {
        return Err(AbiError::InvalidValue(format!(
            "Address must be 20 bytes, got {}",
            bytes.len()
        )));
    }
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&bytes);
    Ok(addr)
}
