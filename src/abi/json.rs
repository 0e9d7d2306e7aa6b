//! Conversion between ABI values and JSON
//!
//! Input accepts what users type: integers as JSON numbers, decimal strings
//! or `0x` hex strings; bytes and addresses as hex strings; arrays and
//! tuples as JSON arrays. Output is lossless: integers are rendered as
//! decimal strings, addresses checksummed, bytes as `0x` hex.

use serde_json::Value;

use super::types::AbiType;
use super::uint::U256;
use super::value::AbiValue;
use crate::error::{AbiError, AbiResult};
use crate::utils::crypto::{decode_hex, encode_hex, parse_address, to_checksum_address};

impl AbiValue {
    /// Build a value of the given type from JSON
    pub fn from_json(abi_type: &AbiType, value: &Value) -> AbiResult<Self> {
        match abi_type {
            AbiType::Uint(bits) => Ok(AbiValue::Uint(*bits, parse_integer(abi_type, *bits, value)?)),
            AbiType::Int(bits) => Ok(AbiValue::Int(*bits, parse_integer(abi_type, *bits, value)?)),
            AbiType::Address => {
                let s = expect_str(abi_type, value)?;
                Ok(AbiValue::Address(parse_address(s)?))
            }
            AbiType::Bool => value
                .as_bool()
                .map(AbiValue::Bool)
                .ok_or_else(|| invalid(abi_type, value)),
            AbiType::FixedBytes(size) => {
                let bytes = decode_hex(expect_str(abi_type, value)?)?;
                if bytes.len() != *size {
                    return Err(AbiError::InvalidValue(format!(
                        "{} needs exactly {} bytes, got {}",
                        abi_type,
                        size,
                        bytes.len()
                    )));
                }
                Ok(AbiValue::FixedBytes(bytes))
            }
            AbiType::Bytes => Ok(AbiValue::Bytes(decode_hex(expect_str(abi_type, value)?)?)),
            AbiType::String => Ok(AbiValue::String(expect_str(abi_type, value)?.to_string())),
            AbiType::Array(inner) => {
                let items = expect_array(abi_type, value)?;
                items
                    .iter()
                    .map(|item| Self::from_json(inner, item))
                    .collect::<AbiResult<Vec<_>>>()
                    .map(AbiValue::Array)
            }
            AbiType::FixedArray(inner, size) => {
                let items = expect_array(abi_type, value)?;
                if items.len() != *size {
                    return Err(AbiError::mismatch(
                        abi_type.canonical_name(),
                        format!("array of {} elements", items.len()),
                    ));
                }
                items
                    .iter()
                    .map(|item| Self::from_json(inner, item))
                    .collect::<AbiResult<Vec<_>>>()
                    .map(AbiValue::FixedArray)
            }
            AbiType::Tuple(types) => {
                let items = expect_array(abi_type, value)?;
                if items.len() != types.len() {
                    return Err(AbiError::mismatch(
                        abi_type.canonical_name(),
                        format!("tuple of {} elements", items.len()),
                    ));
                }
                types
                    .iter()
                    .zip(items)
                    .map(|(t, item)| Self::from_json(t, item))
                    .collect::<AbiResult<Vec<_>>>()
                    .map(AbiValue::Tuple)
            }
        }
    }

    /// Build an argument list from a JSON array
    pub fn list_from_json(types: &[AbiType], value: &Value) -> AbiResult<Vec<Self>> {
        match Self::from_json(&AbiType::Tuple(types.to_vec()), value)? {
            AbiValue::Tuple(values) => Ok(values),
            other => Err(AbiError::mismatch("tuple", other.describe())),
        }
    }

    /// JSON rendering of the value
    pub fn to_json(&self) -> Value {
        match self {
            AbiValue::Uint(_, v) | AbiValue::Int(_, v) => Value::String(v.to_dec_string()),
            AbiValue::Address(addr) => Value::String(to_checksum_address(addr)),
            AbiValue::Bool(b) => Value::Bool(*b),
            AbiValue::FixedBytes(bytes) | AbiValue::Bytes(bytes) => Value::String(encode_hex(bytes)),
            AbiValue::String(s) => Value::String(s.clone()),
            AbiValue::FixedArray(values) | AbiValue::Array(values) | AbiValue::Tuple(values) => {
                Value::Array(values.iter().map(|v| v.to_json()).collect())
            }
        }
    }
}

fn invalid(abi_type: &AbiType, value: &Value) -> AbiError {
    AbiError::InvalidValue(format!("cannot read {} from {}", abi_type, value))
}

fn expect_str<'a>(abi_type: &AbiType, value: &'a Value) -> AbiResult<&'a str> {
    value.as_str().ok_or_else(|| invalid(abi_type, value))
}

fn expect_array<'a>(abi_type: &AbiType, value: &'a Value) -> AbiResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| invalid(abi_type, value))
}

/// Parse a uint value (supports decimal string, hex string, or number)
fn parse_integer(abi_type: &AbiType, bits: usize, value: &Value) -> AbiResult<U256> {
    let parsed = match value {
        Value::Number(n) => match n.as_u64() {
            Some(u) => U256::from_u64(u),
            None if n.as_i64().is_some_and(|i| i < 0) => return Err(negative(abi_type)),
            // Floats and out-of-range literals
            None => return Err(invalid(abi_type, value)),
        },
        Value::String(s) => {
            if s.trim_start().starts_with('-') {
                return Err(negative(abi_type));
            }
            U256::parse(s)?
        }
        _ => return Err(invalid(abi_type, value)),
    };

    if parsed.bit_len() > bits {
        return Err(AbiError::InvalidValue(format!(
            "{} does not fit in {}",
            parsed, abi_type
        )));
    }
    Ok(parsed)
}

fn negative(abi_type: &AbiType) -> AbiError {
    AbiError::InvalidValue(format!("negative values are not supported for {}", abi_type))
}
