//! ABI decoder for Solidity/EVM contracts
//!
//! The decoder never keeps a cursor: every read is given the absolute offset
//! it starts at, and every read is bounds-checked with overflow-safe
//! arithmetic before the buffer is touched.

use super::types::{AbiType, WORD_SIZE};
use super::uint::U256;
use super::value::AbiValue;
use crate::error::{AbiError, AbiResult};
use crate::log_debug;

/// ABI decoder
pub struct AbiDecoder;

/// Running total of decoded output, checked against an optional ceiling.
///
/// Head offsets may alias one tail, so output size is not bounded by input
/// size.
struct Budget {
    limit: Option<usize>,
    used: usize,
}

impl Budget {
    fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    /// Fail if `bytes` more would exceed the ceiling, without consuming
    fn reserve(&self, bytes: usize) -> AbiResult<()> {
        match self.limit {
            Some(limit) if self.used.saturating_add(bytes) > limit => Err(
                AbiError::InvalidLength(format!("decoded output exceeds {} bytes", limit)),
            ),
            _ => Ok(()),
        }
    }

    fn charge(&mut self, bytes: usize) -> AbiResult<()> {
        self.reserve(bytes)?;
        self.used = self.used.saturating_add(bytes);
        Ok(())
    }
}

impl AbiDecoder {
    /// Decode a top-level parameter list (function arguments, return data,
    /// non-indexed event data).
    pub fn decode(types: &[AbiType], data: &[u8]) -> AbiResult<Vec<AbiValue>> {
        Self::decode_with_limit(types, data, None)
    }

    /// [`AbiDecoder::decode`] with a ceiling on decoded output.
    ///
    /// Every value counts one word, plus its payload for `bytes` and
    /// `string`. Exceeding the ceiling fails with `InvalidLength`.
    pub fn decode_with_limit(
        types: &[AbiType],
        data: &[u8],
        max_output: Option<usize>,
    ) -> AbiResult<Vec<AbiValue>> {
        log_debug!("abi::decoder", "Decoding parameters",
            types = types.len(),
            bytes = data.len()
        );
        Self::decode_sequence(types, data, 0, &mut Budget::new(max_output))
    }

    /// Decode one value whose encoding starts at `offset`.
    ///
    /// For a dynamic type `offset` is where its tail begins (the position an
    /// offset word points at); for a static type it is its head position.
    pub fn decode_value(abi_type: &AbiType, data: &[u8], offset: usize) -> AbiResult<AbiValue> {
        Self::decode_within(abi_type, data, offset, &mut Budget::new(None))
    }

    fn decode_within(
        abi_type: &AbiType,
        data: &[u8],
        offset: usize,
        budget: &mut Budget,
    ) -> AbiResult<AbiValue> {
        budget.charge(WORD_SIZE)?;
        match abi_type {
            AbiType::Uint(bits) => {
                Ok(AbiValue::Uint(*bits, U256::from_be_bytes(read_word(data, offset)?)))
            }
            AbiType::Int(bits) => {
                Ok(AbiValue::Int(*bits, U256::from_be_bytes(read_word(data, offset)?)))
            }
            AbiType::Address => {
                let word = read_word(data, offset)?;
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&word[12..]);
                Ok(AbiValue::Address(addr))
            }
            AbiType::Bool => {
                let word = read_word(data, offset)?;
                Ok(AbiValue::Bool(word.iter().any(|&b| b != 0)))
            }
            AbiType::FixedBytes(size) => {
                let word = read_word(data, offset)?;
                Ok(AbiValue::FixedBytes(word[..(*size).min(WORD_SIZE)].to_vec()))
            }
            AbiType::Bytes => {
                let bytes = Self::decode_dynamic_bytes(data, offset)?;
                budget.charge(bytes.len())?;
                Ok(AbiValue::Bytes(bytes.to_vec()))
            }
            AbiType::String => {
                let bytes = Self::decode_dynamic_bytes(data, offset)?;
                budget.charge(bytes.len())?;
                let s = std::str::from_utf8(bytes).map_err(|e| AbiError::InvalidUtf8 {
                    offset: offset.saturating_add(WORD_SIZE),
                    reason: e.to_string(),
                })?;
                Ok(AbiValue::String(s.to_string()))
            }
            AbiType::Array(inner) => {
                let len = read_length(data, offset)?;
                // The count of zero-width elements is not backed by any bytes
                if len > 0 && inner.head_size() == 0 {
                    return Err(AbiError::InvalidType(format!(
                        "dynamic array of zero-width {}",
                        inner.canonical_name()
                    )));
                }
                let region = offset.checked_add(WORD_SIZE).ok_or_else(|| {
                    AbiError::InvalidOffset(format!("array at {} overflows", offset))
                })?;
                Self::decode_repeated(inner, len, data, region, budget).map(AbiValue::Array)
            }
            AbiType::FixedArray(inner, size) => {
                Self::decode_repeated(inner, *size, data, offset, budget)
                    .map(AbiValue::FixedArray)
            }
            AbiType::Tuple(types) => {
                Self::decode_sequence(types, data, offset, budget).map(AbiValue::Tuple)
            }
        }
    }

    /// Head/tail decode of heterogeneous components starting at `base`.
    ///
    /// First pass walks the head and resolves where each component lives;
    /// second pass decodes them.
    fn decode_sequence(
        types: &[AbiType],
        data: &[u8],
        base: usize,
        budget: &mut Budget,
    ) -> AbiResult<Vec<AbiValue>> {
        let mut positions = Vec::with_capacity(types.len());
        let mut head_offset = base;

        for abi_type in types {
            positions.push(locate(abi_type, data, base, head_offset)?);
            head_offset = head_offset
                .checked_add(abi_type.head_size())
                .ok_or_else(|| AbiError::InvalidOffset(format!("head at {} overflows", base)))?;
        }

        types
            .iter()
            .zip(positions)
            .map(|(abi_type, position)| Self::decode_within(abi_type, data, position, budget))
            .collect()
    }

    /// `count` elements of one type in a region starting at `base`.
    ///
    /// A fixed array of zero-width elements takes its count from the type,
    /// so only non-zero strides are measured against the buffer.
    fn decode_repeated(
        element: &AbiType,
        count: usize,
        data: &[u8],
        base: usize,
        budget: &mut Budget,
    ) -> AbiResult<Vec<AbiValue>> {
        let stride = element.head_size();

        // Reject lengths that cannot fit before allocating anything
        if stride > 0 {
            let needed = count.checked_mul(stride).ok_or_else(|| {
                AbiError::InvalidLength(format!("{} elements of {} bytes overflow", count, stride))
            })?;
            check_range(data, base, needed)?;
        }
        budget.reserve(count.saturating_mul(WORD_SIZE))?;

        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            // bounded by the range check above
            let head_offset = base + i * stride;
            let position = locate(element, data, base, head_offset)?;
            values.push(Self::decode_within(element, data, position, budget)?);
        }
        Ok(values)
    }

    /// Length word at `offset`, then that many bytes
    fn decode_dynamic_bytes(data: &[u8], offset: usize) -> AbiResult<&[u8]> {
        let len = read_length(data, offset)?;
        let start = offset.checked_add(WORD_SIZE).ok_or_else(|| {
            AbiError::InvalidOffset(format!("bytes at {} overflow", offset))
        })?;
        read_slice(data, start, len)
    }
}

/// Decode a top-level parameter list
pub fn decode(types: &[AbiType], data: &[u8]) -> AbiResult<Vec<AbiValue>> {
    AbiDecoder::decode(types, data)
}

/// Where the encoding of an element with its head slot at `head_offset` starts.
/// Dynamic elements follow their offset word, relative to `base`.
fn locate(abi_type: &AbiType, data: &[u8], base: usize, head_offset: usize) -> AbiResult<usize> {
    if !abi_type.is_dynamic() {
        return Ok(head_offset);
    }
    let relative = read_offset(data, head_offset)?;
    base.checked_add(relative).ok_or_else(|| {
        AbiError::InvalidOffset(format!("offset {} from base {} overflows", relative, base))
    })
}

fn check_range(data: &[u8], offset: usize, needed: usize) -> AbiResult<()> {
    let insufficient = AbiError::InsufficientData {
        offset,
        needed,
        available: data.len(),
    };
    match offset.checked_add(needed) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(insufficient),
    }
}

fn read_slice(data: &[u8], offset: usize, len: usize) -> AbiResult<&[u8]> {
    check_range(data, offset, len)?;
    Ok(&data[offset..offset + len])
}

fn read_word(data: &[u8], offset: usize) -> AbiResult<&[u8]> {
    read_slice(data, offset, WORD_SIZE)
}

fn read_offset(data: &[u8], offset: usize) -> AbiResult<usize> {
    let value = U256::from_be_bytes(read_word(data, offset)?);
    value.to_usize().ok_or_else(|| {
        AbiError::InvalidOffset(format!("{} at {} is out of range", value.to_hex_string(), offset))
    })
}

fn read_length(data: &[u8], offset: usize) -> AbiResult<usize> {
    let value = U256::from_be_bytes(read_word(data, offset)?);
    value.to_usize().ok_or_else(|| {
        AbiError::InvalidLength(format!("{} at {} is out of range", value.to_hex_string(), offset))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encoder::{encode, AbiEncoder};

    fn word(n: u64) -> [u8; 32] {
        U256::from_u64(n).to_be_bytes()
    }

    fn types(s: &str) -> Vec<AbiType> {
        AbiType::parse_list(s).unwrap()
    }

    #[test]
    fn test_decode_uint256() {
        let data = word(256);
        let values = decode(&[AbiType::Uint(256)], &data).unwrap();
        assert_eq!(values, vec![AbiValue::uint256(256)]);
    }

    #[test]
    fn test_decode_address_uint_bool() {
        let mut data = Vec::new();
        let mut addr_word = [0u8; 32];
        addr_word[12..].copy_from_slice(&[0xaa; 20]);
        data.extend_from_slice(&addr_word);
        data.extend_from_slice(&word(42));
        data.extend_from_slice(&word(1));

        let values = decode(&types("address,uint256,bool"), &data).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], AbiValue::Address([0xaa; 20]));
        assert_eq!(values[1].as_u64(), Some(42));
        assert_eq!(values[2], AbiValue::Bool(true));
    }

    #[test]
    fn test_decode_bool_nonzero_is_true() {
        let mut data = [0u8; 32];
        data[0] = 0x80;
        assert_eq!(decode(&[AbiType::Bool], &data).unwrap(), vec![AbiValue::Bool(true)]);
    }

    #[test]
    fn test_decode_int_no_sign_extension() {
        let data = [0xff; 32];
        let values = decode(&[AbiType::Int(8)], &data).unwrap();
        assert_eq!(values[0], AbiValue::Int(8, U256::MAX));
    }

    #[test]
    fn test_decode_fixed_bytes() {
        let mut data = [0u8; 32];
        data[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let values = decode(&[AbiType::FixedBytes(4)], &data).unwrap();
        assert_eq!(values[0], AbiValue::FixedBytes(vec![0xde, 0xad, 0xbe, 0xef]));
    }

    #[test]
    fn test_decode_string() {
        let mut data = Vec::new();
        data.extend_from_slice(&word(32));
        data.extend_from_slice(&word(5));
        let mut content = [0u8; 32];
        content[..5].copy_from_slice(b"hello");
        data.extend_from_slice(&content);

        let values = decode(&[AbiType::String], &data).unwrap();
        assert_eq!(values[0].as_str(), Some("hello"));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut data = Vec::new();
        data.extend_from_slice(&word(32));
        data.extend_from_slice(&word(2));
        let mut content = [0u8; 32];
        content[..2].copy_from_slice(&[0xc3, 0x28]);
        data.extend_from_slice(&content);

        let err = decode(&[AbiType::String], &data).unwrap_err();
        assert!(matches!(err, AbiError::InvalidUtf8 { offset: 64, .. }));
    }

    #[test]
    fn test_exact_length_and_one_short() {
        let value = AbiValue::Tuple(vec![
            AbiValue::uint256(1),
            AbiValue::Bytes(vec![0x5a; 32]),
        ]);
        let data = encode(&value);
        assert_eq!(data.len(), 128);
        let t = types("uint256,bytes");

        assert!(decode(&t, &data).is_ok());
        let err = decode(&t, &data[..data.len() - 1]).unwrap_err();
        assert!(matches!(err, AbiError::InsufficientData { .. }));
    }

    #[test]
    fn test_empty_input_needs_data() {
        assert!(decode(&[], &[]).unwrap().is_empty());
        assert!(matches!(
            decode(&[AbiType::Uint(256)], &[]),
            Err(AbiError::InsufficientData { offset: 0, needed: 32, available: 0 })
        ));
    }

    #[test]
    fn test_offset_out_of_range() {
        let data = [0xff; 32];
        let err = decode(&[AbiType::Bytes], &data).unwrap_err();
        assert!(matches!(err, AbiError::InvalidOffset(_)));
    }

    #[test]
    fn test_length_out_of_range() {
        let mut data = Vec::new();
        data.extend_from_slice(&word(32));
        data.extend_from_slice(&[0xff; 32]);
        let err = decode(&[AbiType::String], &data).unwrap_err();
        assert!(matches!(err, AbiError::InvalidLength(_)));
    }

    #[test]
    fn test_huge_array_length_rejected_before_allocation() {
        let mut data = Vec::new();
        data.extend_from_slice(&word(32));
        data.extend_from_slice(&word(1 << 40));
        let err = decode(&types("uint256[]"), &data).unwrap_err();
        assert!(matches!(err, AbiError::InsufficientData { offset: 64, .. }));
    }

    #[test]
    fn test_offset_pointing_past_end() {
        let mut data = Vec::new();
        data.extend_from_slice(&word(1024));
        let err = decode(&[AbiType::Bytes], &data).unwrap_err();
        assert!(matches!(err, AbiError::InsufficientData { offset: 1024, .. }));
    }

    #[test]
    fn test_decode_nested_dynamic() {
        let value = AbiValue::Tuple(vec![
            AbiValue::Array(vec![
                AbiValue::Array(vec![AbiValue::uint256(1), AbiValue::uint256(2)]),
                AbiValue::Array(vec![]),
            ]),
            AbiValue::Tuple(vec![AbiValue::String("x".into()), AbiValue::Bool(true)]),
            AbiValue::FixedArray(vec![
                AbiValue::Bytes(vec![0xab]),
                AbiValue::Bytes(vec![]),
            ]),
        ]);
        let data = encode(&value);
        let decoded = decode(&types("uint256[][],(string,bool),bytes[2]"), &data).unwrap();
        assert_eq!(AbiValue::Tuple(decoded), value);
    }

    #[test]
    fn test_decode_static_composites_inline() {
        let value = AbiValue::Tuple(vec![
            AbiValue::FixedArray(vec![AbiValue::uint256(3), AbiValue::uint256(4)]),
            AbiValue::String("after".into()),
            AbiValue::Tuple(vec![AbiValue::Address([7; 20]), AbiValue::Bool(false)]),
        ]);
        let data = encode(&value);
        let decoded = decode(&types("uint256[2],string,(address,bool)"), &data).unwrap();
        assert_eq!(AbiValue::Tuple(decoded), value);
    }

    #[test]
    fn test_decode_value_at_offset() {
        let mut data = vec![0u8; 32];
        data.extend_from_slice(&word(99));
        let value = AbiDecoder::decode_value(&AbiType::Uint(64), &data, 32).unwrap();
        assert_eq!(value, AbiValue::uint(64, 99u64));
    }

    #[test]
    fn test_zero_width_fixed_array_roundtrip() {
        let ty = AbiType::parse("()[5]").unwrap();
        let value = AbiValue::FixedArray(vec![AbiValue::Tuple(vec![]); 5]);
        let encoded = AbiEncoder::encode_sequence(&[value.clone()]);
        assert!(encoded.is_empty());
        assert_eq!(decode(&[ty], &encoded).unwrap(), vec![value]);
    }

    #[test]
    fn test_zero_width_dynamic_array_rejected() {
        let ty = AbiType::Array(Box::new(AbiType::Tuple(vec![])));

        let empty = AbiDecoder::decode_value(&ty, &word(0), 0).unwrap();
        assert_eq!(empty, AbiValue::Array(vec![]));

        let err = AbiDecoder::decode_value(&ty, &word(100), 0).unwrap_err();
        assert!(matches!(err, AbiError::InvalidType(_)));
    }

    #[test]
    fn test_output_limit_bounds_aliased_offsets() {
        // bytes[] of 64 elements, every offset pointing at one 256-byte payload
        let count = 64u64;
        let mut data = Vec::new();
        data.extend_from_slice(&word(32));
        data.extend_from_slice(&word(count));
        for _ in 0..count {
            data.extend_from_slice(&word(count * 32));
        }
        data.extend_from_slice(&word(256));
        data.extend_from_slice(&[0xab; 256]);

        let ty = types("bytes[]");
        let unlimited = AbiDecoder::decode(&ty, &data).unwrap();
        assert_eq!(unlimited[0].as_slice().map(|v| v.len()), Some(64));

        let err = AbiDecoder::decode_with_limit(&ty, &data, Some(4096)).unwrap_err();
        assert!(matches!(err, AbiError::InvalidLength(_)));
        assert!(AbiDecoder::decode_with_limit(&ty, &data, Some(64 * 1024)).is_ok());
    }
}
