//! ABI values - runtime representation of Solidity data
//!
//! An [`AbiValue`] mirrors the shape of an [`AbiType`] but carries data. It
//! can be built as a literal without any type at hand and knows enough about
//! itself to encode: integer widths travel with the value, and dynamism is
//! derived from the variant (see [`AbiValue::is_dynamic`]).

use super::types::{AbiType, WORD_SIZE};
use super::uint::U256;
use crate::error::{AbiError, AbiResult};
use crate::utils::crypto;

/// Runtime value tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiValue {
    /// `uintN` value: bit width and magnitude
    Uint(usize, U256),
    /// `intN` value: bit width and magnitude.
    ///
    /// Encoded and decoded exactly like [`AbiValue::Uint`]: no two's
    /// complement, so negative numbers cannot be represented.
    Int(usize, U256),
    /// 20-byte address
    Address([u8; 20]),
    Bool(bool),
    /// `bytesN` payload (N = length)
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// `T[N]` elements
    FixedArray(Vec<AbiValue>),
    /// `T[]` elements
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// `uint256` from a u64
    pub fn uint256(value: u64) -> Self {
        AbiValue::Uint(256, U256::from_u64(value))
    }

    /// `uintN` from anything convertible to U256
    pub fn uint(bits: usize, value: impl Into<U256>) -> Self {
        AbiValue::Uint(bits, value.into())
    }

    /// `intN` from a non-negative magnitude
    pub fn int(bits: usize, magnitude: impl Into<U256>) -> Self {
        AbiValue::Int(bits, magnitude.into())
    }

    /// `uint256` from decimal or `0x` hex text
    pub fn uint256_from_str(s: &str) -> AbiResult<Self> {
        Ok(AbiValue::Uint(256, U256::parse(s)?))
    }

    /// Address from hex text
    pub fn address_from_str(s: &str) -> AbiResult<Self> {
        Ok(AbiValue::Address(crypto::parse_address(s)?))
    }

    /// Dynamic bytes from hex text
    pub fn bytes_from_hex(s: &str) -> AbiResult<Self> {
        Ok(AbiValue::Bytes(crypto::decode_hex(s)?))
    }

    /// `bytesN` from hex text; N must be 1..=32
    pub fn fixed_bytes_from_hex(s: &str) -> AbiResult<Self> {
        let bytes = crypto::decode_hex(s)?;
        if bytes.is_empty() || bytes.len() > 32 {
            return Err(AbiError::InvalidValue(format!(
                "fixed bytes must be 1-32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(AbiValue::FixedBytes(bytes))
    }

    /// Whether this value is encoded out of line.
    ///
    /// A fixed array looks only at its first element: values decoded from a
    /// single type always agree, but a hand-built array mixing static and
    /// dynamic elements is classified by whatever comes first.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiValue::Bytes(_) | AbiValue::String(_) | AbiValue::Array(_) => true,
            AbiValue::FixedArray(values) => values.first().is_some_and(|v| v.is_dynamic()),
            AbiValue::Tuple(values) => values.iter().any(|v| v.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes this value occupies in the head region of an enclosing sequence
    pub fn head_size(&self) -> usize {
        match self {
            AbiValue::FixedArray(values) | AbiValue::Tuple(values) if !self.is_dynamic() => {
                values.iter().map(|v| v.head_size()).sum()
            }
            _ => WORD_SIZE,
        }
    }

    /// Variants that are hashed rather than inlined when used as a topic
    pub fn is_hashed_in_topic(&self) -> bool {
        matches!(
            self,
            AbiValue::Bytes(_)
                | AbiValue::String(_)
                | AbiValue::Array(_)
                | AbiValue::FixedArray(_)
                | AbiValue::Tuple(_)
        )
    }

    /// ABI encoding of this value
    pub fn encode(&self) -> Vec<u8> {
        super::encoder::AbiEncoder::encode(self)
    }

    /// Best-effort type of this value. `None` when it cannot be derived,
    /// e.g. for an empty array or an out-of-range fixed bytes payload.
    pub fn type_of(&self) -> Option<AbiType> {
        Some(match self {
            AbiValue::Uint(bits, _) => AbiType::Uint(*bits),
            AbiValue::Int(bits, _) => AbiType::Int(*bits),
            AbiValue::Address(_) => AbiType::Address,
            AbiValue::Bool(_) => AbiType::Bool,
            AbiValue::FixedBytes(b) if (1..=32).contains(&b.len()) => AbiType::FixedBytes(b.len()),
            AbiValue::FixedBytes(_) => return None,
            AbiValue::Bytes(_) => AbiType::Bytes,
            AbiValue::String(_) => AbiType::String,
            AbiValue::FixedArray(values) => {
                AbiType::FixedArray(Box::new(values.first()?.type_of()?), values.len())
            }
            AbiValue::Array(values) => AbiType::Array(Box::new(values.first()?.type_of()?)),
            AbiValue::Tuple(values) => AbiType::Tuple(
                values.iter().map(|v| v.type_of()).collect::<Option<Vec<_>>>()?,
            ),
        })
    }

    /// Short description for error messages
    pub fn describe(&self) -> String {
        if let Some(t) = self.type_of() {
            return t.canonical_name();
        }
        match self {
            AbiValue::FixedBytes(b) => format!("bytes{}", b.len()),
            AbiValue::FixedArray(v) => format!("array[{}]", v.len()),
            AbiValue::Array(v) => format!("array[] of {}", v.len()),
            AbiValue::Tuple(v) => format!("tuple of {}", v.len()),
            _ => "value".to_string(),
        }
    }

    /// Structural check against a type descriptor
    pub fn conforms_to(&self, abi_type: &AbiType) -> bool {
        match (self, abi_type) {
            (AbiValue::Uint(bits, _), AbiType::Uint(expected)) => bits == expected,
            (AbiValue::Int(bits, _), AbiType::Int(expected)) => bits == expected,
            (AbiValue::Address(_), AbiType::Address) => true,
            (AbiValue::Bool(_), AbiType::Bool) => true,
            (AbiValue::FixedBytes(b), AbiType::FixedBytes(size)) => b.len() == *size,
            (AbiValue::Bytes(_), AbiType::Bytes) => true,
            (AbiValue::String(_), AbiType::String) => true,
            (AbiValue::FixedArray(values), AbiType::FixedArray(inner, size)) => {
                values.len() == *size && values.iter().all(|v| v.conforms_to(inner))
            }
            (AbiValue::Array(values), AbiType::Array(inner)) => {
                values.iter().all(|v| v.conforms_to(inner))
            }
            (AbiValue::Tuple(values), AbiType::Tuple(types)) => {
                values.len() == types.len()
                    && values.iter().zip(types).all(|(v, t)| v.conforms_to(t))
            }
            _ => false,
        }
    }

    /// Magnitude of an integer value
    pub fn as_u256(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(_, v) | AbiValue::Int(_, v) => Some(*v),
            _ => None,
        }
    }

    /// Integer value that fits a u64
    pub fn as_u64(&self) -> Option<u64> {
        self.as_u256().and_then(|v| v.to_u64())
    }

    pub fn as_address(&self) -> Option<[u8; 20]> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Payload of fixed or dynamic bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of an array, fixed array or tuple
    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::FixedArray(v) | AbiValue::Array(v) | AbiValue::Tuple(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for AbiValue {
    fn from(b: bool) -> Self {
        AbiValue::Bool(b)
    }
}

impl From<String> for AbiValue {
    fn from(s: String) -> Self {
        AbiValue::String(s)
    }
}

impl From<&str> for AbiValue {
    fn from(s: &str) -> Self {
        AbiValue::String(s.to_string())
    }
}

impl From<[u8; 20]> for AbiValue {
    fn from(a: [u8; 20]) -> Self {
        AbiValue::Address(a)
    }
}
