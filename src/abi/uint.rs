//! 256-bit unsigned magnitude used for integer words, offsets and lengths

use std::fmt;

use crate::error::{AbiError, AbiResult};

/// 256-bit unsigned integer, little-endian limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct U256(pub [u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0, 0, 0, 0]);
    pub const ONE: U256 = U256([1, 0, 0, 0]);
    pub const MAX: U256 = U256([u64::MAX, u64::MAX, u64::MAX, u64::MAX]);

    /// Create from u64
    pub const fn from_u64(value: u64) -> Self {
        U256([value, 0, 0, 0])
    }

    /// Create from u128
    pub const fn from_u128(value: u128) -> Self {
        U256([value as u64, (value >> 64) as u64, 0, 0])
    }

    /// Create from big-endian bytes. Inputs longer than 32 bytes keep the
    /// trailing (least significant) 32.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let mut padded = [0u8; 32];
        let take = bytes.len().min(32);
        padded[32 - take..].copy_from_slice(&bytes[bytes.len() - take..]);

        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let offset = (3 - i) * 8;
            let mut word = [0u8; 8];
            word.copy_from_slice(&padded[offset..offset + 8]);
            *limb = u64::from_be_bytes(word);
        }
        U256(limbs)
    }

    /// Big-endian 32-byte word
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for i in 0..4 {
            let offset = (3 - i) * 8;
            bytes[offset..offset + 8].copy_from_slice(&self.0[i].to_be_bytes());
        }
        bytes
    }

    /// Parse from hex (optional `0x` prefix, odd lengths allowed)
    pub fn from_hex(s: &str) -> AbiResult<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(AbiError::InvalidValue("empty hex number".to_string()));
        }
        let digits = digits.trim_start_matches('0');
        if digits.len() > 64 {
            return Err(AbiError::Overflow);
        }
        let normalized = if digits.len() % 2 == 1 {
            format!("0{}", digits)
        } else {
            digits.to_string()
        };
        let bytes = hex::decode(normalized)?;
        Ok(Self::from_be_bytes(&bytes))
    }

    /// Parse from a decimal string
    pub fn from_dec(s: &str) -> AbiResult<Self> {
        if s.is_empty() {
            return Err(AbiError::InvalidValue("empty decimal number".to_string()));
        }
        let mut result = U256::ZERO;
        for c in s.chars() {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| AbiError::InvalidValue(format!("Invalid decimal digit: {}", c)))?;
            result = result.checked_mul_u64(10).ok_or(AbiError::Overflow)?;
            result = result
                .checked_add(U256::from_u64(digit as u64))
                .ok_or(AbiError::Overflow)?;
        }
        Ok(result)
    }

    /// Parse decimal or `0x`-prefixed hex
    pub fn parse(s: &str) -> AbiResult<Self> {
        let s = s.trim();
        if s.starts_with("0x") || s.starts_with("0X") {
            Self::from_hex(s)
        } else {
            Self::from_dec(s)
        }
    }

    /// Checked addition
    pub fn checked_add(&self, other: U256) -> Option<U256> {
        let mut result = [0u64; 4];
        let mut carry = 0u64;

        for i in 0..4 {
            let (sum1, c1) = self.0[i].overflowing_add(other.0[i]);
            let (sum2, c2) = sum1.overflowing_add(carry);
            result[i] = sum2;
            carry = (c1 as u64) + (c2 as u64);
        }

        if carry != 0 { None } else { Some(U256(result)) }
    }

    /// Checked multiplication by u64
    pub fn checked_mul_u64(&self, other: u64) -> Option<U256> {
        let mut result = [0u64; 4];
        let mut carry = 0u128;

        for i in 0..4 {
            let prod = (self.0[i] as u128) * (other as u128) + carry;
            result[i] = prod as u64;
            carry = prod >> 64;
        }

        if carry != 0 { None } else { Some(U256(result)) }
    }

    /// Divide by a non-zero u64, returning quotient and remainder
    fn div_rem_u64(&self, divisor: u64) -> (U256, u64) {
        let mut quotient = [0u64; 4];
        let mut rem = 0u128;
        for i in (0..4).rev() {
            let cur = (rem << 64) | self.0[i] as u128;
            quotient[i] = (cur / divisor as u128) as u64;
            rem = cur % divisor as u128;
        }
        (U256(quotient), rem as u64)
    }

    /// Number of significant bits
    pub fn bit_len(&self) -> usize {
        for i in (0..4).rev() {
            if self.0[i] != 0 {
                return i * 64 + (64 - self.0[i].leading_zeros() as usize);
            }
        }
        0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0, 0]
    }

    /// Exact conversion to u64, `None` when the value is wider
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[1..].iter().all(|&limb| limb == 0) {
            Some(self.0[0])
        } else {
            None
        }
    }

    /// Exact conversion to u128
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[2] == 0 && self.0[3] == 0 {
            Some((self.0[1] as u128) << 64 | self.0[0] as u128)
        } else {
            None
        }
    }

    /// Exact conversion to the platform's addressable range
    pub fn to_usize(&self) -> Option<usize> {
        self.to_u64().and_then(|v| usize::try_from(v).ok())
    }

    /// Decimal rendering
    pub fn to_dec_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut digits = Vec::new();
        let mut value = *self;
        while !value.is_zero() {
            let (q, r) = value.div_rem_u64(10);
            digits.push(b'0' + r as u8);
            value = q;
        }
        digits.reverse();
        String::from_utf8(digits).unwrap_or_default()
    }

    /// `0x`-prefixed minimal hex rendering
    pub fn to_hex_string(&self) -> String {
        let full = hex::encode(self.to_be_bytes());
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256::from_u64(value)
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        U256::from_u128(value)
    }
}

impl From<usize> for U256 {
    fn from(value: usize) -> Self {
        U256::from_u64(value as u64)
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dec_string())
    }
}
