//! ABI encoder for Solidity/EVM contracts
//!
//! Encoding is driven by the value alone: every [`AbiValue`] knows its own
//! dynamism and head size, so no type descriptor is needed.

use super::selector::{AbiSelector, Keccak256, TinyKeccak};
use super::types::WORD_SIZE;
use super::uint::U256;
use super::value::AbiValue;
use crate::log_debug;
use crate::utils::crypto::encode_hex;

/// ABI encoder
pub struct AbiEncoder;

impl AbiEncoder {
    /// Encode a single value
    pub fn encode(value: &AbiValue) -> Vec<u8> {
        let mut out = Vec::new();
        Self::encode_into(value, &mut out);
        out
    }

    /// Append the encoding of `value` to `out`
    pub fn encode_into(value: &AbiValue, out: &mut Vec<u8>) {
        if let Some(word) = Self::static_word(value) {
            out.extend_from_slice(&word);
            return;
        }

        match value {
            AbiValue::Bytes(bytes) => Self::encode_dynamic_bytes(bytes, out),
            AbiValue::String(s) => Self::encode_dynamic_bytes(s.as_bytes(), out),
            AbiValue::Array(values) => {
                out.extend_from_slice(&U256::from(values.len()).to_be_bytes());
                Self::encode_sequence_into(values, out);
            }
            // No length prefix for fixed arrays and tuples
            AbiValue::FixedArray(values) | AbiValue::Tuple(values) => {
                Self::encode_sequence_into(values, out);
            }
            _ => {}
        }
    }

    /// Encode an ordered list of values with the head/tail scheme.
    ///
    /// This is the layout of function arguments, tuples and array bodies.
    pub fn encode_sequence(values: &[AbiValue]) -> Vec<u8> {
        let mut out = Vec::new();
        Self::encode_sequence_into(values, &mut out);
        out
    }

    fn encode_sequence_into(values: &[AbiValue], out: &mut Vec<u8>) {
        let head_size: usize = values.iter().map(|v| v.head_size()).sum();

        let mut head = Vec::with_capacity(head_size);
        let mut tail = Vec::new();

        for value in values {
            if value.is_dynamic() {
                // Offset is relative to the start of this head region
                let offset = head_size + tail.len();
                head.extend_from_slice(&U256::from(offset).to_be_bytes());
                Self::encode_into(value, &mut tail);
            } else {
                Self::encode_into(value, &mut head);
            }
        }

        out.extend_from_slice(&head);
        out.extend_from_slice(&tail);
    }

    /// The single 32-byte word of a scalar value; `None` for composites
    /// and dynamic values.
    pub fn static_word(value: &AbiValue) -> Option<[u8; 32]> {
        let mut word = [0u8; WORD_SIZE];
        match value {
            AbiValue::Uint(_, v) | AbiValue::Int(_, v) => word = v.to_be_bytes(),
            AbiValue::Address(addr) => word[12..].copy_from_slice(addr),
            AbiValue::Bool(b) => word[31] = u8::from(*b),
            AbiValue::FixedBytes(bytes) => {
                let len = bytes.len().min(WORD_SIZE);
                word[..len].copy_from_slice(&bytes[..len]);
            }
            _ => return None,
        }
        Some(word)
    }

    /// Length word followed by the content right-padded to 32 bytes
    fn encode_dynamic_bytes(bytes: &[u8], out: &mut Vec<u8>) {
        let padded_len = bytes.len().div_ceil(WORD_SIZE) * WORD_SIZE;
        out.extend_from_slice(&U256::from(bytes.len()).to_be_bytes());
        let start = out.len();
        out.extend_from_slice(bytes);
        out.resize(start + padded_len, 0);
    }

    /// Encode a function call: selector ++ encoded argument tuple
    pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
        Self::encode_call_with(&TinyKeccak, signature, args)
    }

    /// [`AbiEncoder::encode_call`] with an injected hasher
    pub fn encode_call_with<H: Keccak256 + ?Sized>(
        hasher: &H,
        signature: &str,
        args: &[AbiValue],
    ) -> Vec<u8> {
        let selector = AbiSelector::selector_with(hasher, signature);
        let params = Self::encode_sequence(args);

        let mut result = Vec::with_capacity(4 + params.len());
        result.extend_from_slice(&selector);
        result.extend_from_slice(&params);

        log_debug!("abi::encoder", "Encoded call",
            signature = signature,
            args = args.len(),
            calldata = encode_hex(&result)
        );
        result
    }
}

/// Encode a single value
pub fn encode(value: &AbiValue) -> Vec<u8> {
    AbiEncoder::encode(value)
}

/// Encode a function call by signature string
/// e.g., "transfer(address,uint256)" with values
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
    AbiEncoder::encode_call(signature, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(n: u64) -> [u8; 32] {
        U256::from_u64(n).to_be_bytes()
    }

    #[test]
    fn test_encode_uint256() {
        let encoded = encode(&AbiValue::uint256(256));

        assert_eq!(encoded.len(), 32);
        assert!(encoded[..30].iter().all(|&b| b == 0));
        assert_eq!(encoded[30], 1);
        assert_eq!(encoded[31], 0);
    }

    #[test]
    fn test_encode_int_as_magnitude() {
        assert_eq!(encode(&AbiValue::int(8, 5u64)), word(5).to_vec());
    }

    #[test]
    fn test_encode_address() {
        let mut addr = [0u8; 20];
        addr[0] = 0xde;
        addr[19] = 0xad;

        let encoded = encode(&AbiValue::Address(addr));

        assert_eq!(encoded.len(), 32);
        assert!(encoded[..12].iter().all(|&b| b == 0));
        assert_eq!(encoded[12], 0xde);
        assert_eq!(encoded[31], 0xad);
    }

    #[test]
    fn test_encode_bool() {
        assert_eq!(encode(&AbiValue::Bool(true))[31], 1);
        assert_eq!(encode(&AbiValue::Bool(false)), vec![0u8; 32]);
    }

    #[test]
    fn test_encode_fixed_bytes() {
        let encoded = encode(&AbiValue::FixedBytes(vec![0xab, 0xcd]));
        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[..2], &[0xab, 0xcd]);
        assert!(encoded[2..].iter().all(|&b| b == 0));

        // Longer payloads are cut to one word
        let encoded = encode(&AbiValue::FixedBytes(vec![0x11; 40]));
        assert_eq!(encoded, vec![0x11; 32]);
    }

    #[test]
    fn test_encode_string() {
        let encoded = encode(&AbiValue::String("hello".into()));

        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[..32], &word(5));
        assert_eq!(&encoded[32..37], b"hello");
        assert!(encoded[37..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_bytes_exact_word() {
        let encoded = encode(&AbiValue::Bytes(vec![0x42; 32]));
        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[..32], &word(32));
    }

    #[test]
    fn test_encode_empty_dynamic() {
        assert_eq!(encode(&AbiValue::String(String::new())), vec![0u8; 32]);
        assert_eq!(encode(&AbiValue::Bytes(vec![])), vec![0u8; 32]);
        assert_eq!(encode(&AbiValue::Array(vec![])), vec![0u8; 32]);
    }

    #[test]
    fn test_encode_static_array() {
        let value = AbiValue::Array(vec![AbiValue::uint256(1), AbiValue::uint256(2)]);
        let encoded = encode(&value);

        assert_eq!(encoded.len(), 96);
        assert_eq!(&encoded[..32], &word(2));
        assert_eq!(&encoded[32..64], &word(1));
        assert_eq!(&encoded[64..], &word(2));
    }

    #[test]
    fn test_encode_array_of_strings() {
        let value = AbiValue::Array(vec![
            AbiValue::String("a".into()),
            AbiValue::String("b".into()),
        ]);
        let encoded = encode(&value);

        // length, 2 offsets, 2 x (length + data)
        assert_eq!(encoded.len(), 32 * 7);
        assert_eq!(&encoded[..32], &word(2));
        assert_eq!(&encoded[32..64], &word(64));
        assert_eq!(&encoded[64..96], &word(128));
        assert_eq!(&encoded[96..128], &word(1));
        assert_eq!(encoded[128], b'a');
    }

    #[test]
    fn test_encode_static_tuple_inline() {
        let value = AbiValue::Tuple(vec![
            AbiValue::FixedArray(vec![AbiValue::uint256(7), AbiValue::uint256(8)]),
            AbiValue::Bool(true),
        ]);
        let encoded = encode(&value);
        assert_eq!(encoded.len(), 96);
        assert_eq!(&encoded[..32], &word(7));
        assert_eq!(&encoded[32..64], &word(8));
        assert_eq!(encoded[95], 1);
    }

    #[test]
    fn test_head_accounts_for_static_composites() {
        // (uint256[2], string): head is 64 + 32 bytes, so the string sits at 96
        let args = vec![
            AbiValue::FixedArray(vec![AbiValue::uint256(1), AbiValue::uint256(2)]),
            AbiValue::String("x".into()),
        ];
        let encoded = AbiEncoder::encode_sequence(&args);
        assert_eq!(&encoded[64..96], &word(96));
        assert_eq!(&encoded[96..128], &word(1));
        assert_eq!(encoded.len(), 160);
    }

    #[test]
    fn test_encode_transfer_call() {
        let mut to = [0u8; 20];
        to[19] = 0x01;
        let calldata = encode_call(
            "transfer(address,uint256)",
            &[AbiValue::Address(to), AbiValue::uint256(1000)],
        );

        assert_eq!(calldata.len(), 4 + 64);
        assert_eq!(hex::encode(&calldata[..4]), "a9059cbb");
        assert_eq!(calldata[35], 0x01);
        assert_eq!(&calldata[36..], &word(1000));
    }

    #[test]
    fn test_encode_call_with_injected_hasher() {
        let fixed = |_: &[u8]| -> [u8; 32] { [0xee; 32] };
        let calldata = AbiEncoder::encode_call_with(&fixed, "f()", &[]);
        assert_eq!(calldata, vec![0xee; 4]);
    }

    #[test]
    fn test_alignment() {
        let values = vec![
            AbiValue::String("a somewhat longer string that spans two words".into()),
            AbiValue::Bytes(vec![1, 2, 3]),
            AbiValue::Array(vec![AbiValue::Array(vec![AbiValue::Bool(true)])]),
            AbiValue::FixedBytes(vec![9]),
        ];
        for v in &values {
            assert_eq!(encode(v).len() % 32, 0);
        }
        assert_eq!(AbiEncoder::encode_sequence(&values).len() % 32, 0);
    }

    #[test]
    fn test_static_word() {
        assert!(AbiEncoder::static_word(&AbiValue::Bytes(vec![])).is_none());
        assert!(AbiEncoder::static_word(&AbiValue::Tuple(vec![])).is_none());
        assert_eq!(AbiEncoder::static_word(&AbiValue::uint256(3)), Some(word(3)));
    }
}
