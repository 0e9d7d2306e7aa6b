//! ABI type descriptors for Solidity/EVM contracts
//!
//! [`AbiType`] is the parsed form of a canonical type string such as
//! `uint256`, `address[3]` or `(address,uint256)[]`. It is immutable once
//! parsed and is meant to be built once per ABI item and reused across
//! many encode/decode calls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AbiError, AbiResult};

/// Size of an ABI word in bytes
pub const WORD_SIZE: usize = 32;

/// Solidity type tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AbiType {
    /// `uintN`, N in 8..=256 step 8
    Uint(usize),
    /// `intN`, N in 8..=256 step 8
    Int(usize),
    Address,
    Bool,
    /// `bytesN`, N in 1..=32
    FixedBytes(usize),
    Bytes,
    String,
    /// `T[N]`
    FixedArray(Box<AbiType>, usize),
    /// `T[]`
    Array(Box<AbiType>),
    /// `(T1,T2,...)`
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Check if the type is dynamic (requires offset encoding)
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(components) => components.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head region of an enclosing tuple
    pub fn head_size(&self) -> usize {
        match self {
            AbiType::Tuple(components) if !self.is_dynamic() => components
                .iter()
                .fold(0, |acc, t| acc.saturating_add(t.head_size())),
            AbiType::FixedArray(inner, size) if !self.is_dynamic() => {
                inner.head_size().saturating_mul(*size)
            }
            _ => WORD_SIZE,
        }
    }

    /// Types whose indexed event values are stored as a hash rather than a word
    pub fn is_hashed_in_topic(&self) -> bool {
        matches!(
            self,
            AbiType::Bytes
                | AbiType::String
                | AbiType::Array(_)
                | AbiType::FixedArray(..)
                | AbiType::Tuple(_)
        )
    }

    /// Parse a canonical type string
    pub fn parse(s: &str) -> AbiResult<Self> {
        Self::parse_with_limit(s, None)
    }

    /// Parse with an optional bound on array/tuple nesting depth
    pub fn parse_with_limit(s: &str, max_depth: Option<usize>) -> AbiResult<Self> {
        TypeParser { max_depth }.parse(s, 0)
    }

    /// Parse a comma-separated list such as the parameter part of a signature
    pub fn parse_list(s: &str) -> AbiResult<Vec<Self>> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(vec![]);
        }
        split_top_level(s)?
            .into_iter()
            .map(Self::parse)
            .collect()
    }

    /// Get the canonical type string for signature calculation
    pub fn canonical_name(&self) -> String {
        match self {
            AbiType::Uint(bits) => format!("uint{}", bits),
            AbiType::Int(bits) => format!("int{}", bits),
            AbiType::Address => "address".to_string(),
            AbiType::Bool => "bool".to_string(),
            AbiType::FixedBytes(size) => format!("bytes{}", size),
            AbiType::Bytes => "bytes".to_string(),
            AbiType::String => "string".to_string(),
            AbiType::Array(inner) => format!("{}[]", inner.canonical_name()),
            AbiType::FixedArray(inner, size) => format!("{}[{}]", inner.canonical_name(), size),
            AbiType::Tuple(components) => {
                let inner = components
                    .iter()
                    .map(|t| t.canonical_name())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({})", inner)
            }
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AbiType {
    type Error = AbiError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AbiType> for String {
    fn from(t: AbiType) -> Self {
        t.canonical_name()
    }
}

struct TypeParser {
    max_depth: Option<usize>,
}

impl TypeParser {
    fn parse(&self, s: &str, depth: usize) -> AbiResult<AbiType> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AbiError::InvalidType("empty type".to_string()));
        }

        if s.ends_with(']') {
            self.check_depth(s, depth)?;
            return self.parse_array(s, depth);
        }

        if s.starts_with('(') {
            self.check_depth(s, depth)?;
            return self.parse_tuple(s, depth);
        }

        parse_base(s)
    }

    fn check_depth(&self, s: &str, depth: usize) -> AbiResult<()> {
        match self.max_depth {
            Some(max) if depth >= max => Err(AbiError::InvalidType(format!(
                "nesting deeper than {} levels: {}",
                max, s
            ))),
            _ => Ok(()),
        }
    }

    /// `s` ends with `]`; the last bracket group is the outermost dimension
    fn parse_array(&self, s: &str, depth: usize) -> AbiResult<AbiType> {
        let bytes = s.as_bytes();
        let mut level = 0usize;
        let mut open = None;
        for i in (0..bytes.len()).rev() {
            match bytes[i] {
                b']' => level += 1,
                b'[' => {
                    level = level
                        .checked_sub(1)
                        .ok_or_else(|| mismatched(s))?;
                    if level == 0 {
                        open = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let open = open.ok_or_else(|| mismatched(s))?;

        let element = self.parse(&s[..open], depth + 1)?;
        let size = s[open + 1..s.len() - 1].trim();
        if size.is_empty() {
            // A length word with no element bytes behind it cannot be bounded
            if element.head_size() == 0 {
                return Err(AbiError::InvalidType(format!(
                    "zero-width dynamic array element: {}",
                    s
                )));
            }
            return Ok(AbiType::Array(Box::new(element)));
        }
        let size = parse_decimal(size)
            .ok_or_else(|| AbiError::InvalidType(format!("Invalid array size: {}", size)))?;
        Ok(AbiType::FixedArray(Box::new(element), size))
    }

    fn parse_tuple(&self, s: &str, depth: usize) -> AbiResult<AbiType> {
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| mismatched(s))?;

        if inner.trim().is_empty() {
            return Ok(AbiType::Tuple(vec![]));
        }

        let components = split_top_level(inner)?
            .into_iter()
            .map(|part| self.parse(part, depth + 1))
            .collect::<AbiResult<Vec<_>>>()?;
        Ok(AbiType::Tuple(components))
    }
}

fn mismatched(s: &str) -> AbiError {
    AbiError::InvalidType(format!("mismatched brackets: {}", s))
}

/// Split on commas that are not nested inside parentheses or brackets
pub(crate) fn split_top_level(s: &str) -> AbiResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.checked_sub(1).ok_or_else(|| mismatched(s))?,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(mismatched(s));
    }
    parts.push(&s[start..]);

    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(AbiError::InvalidType(format!("empty tuple component: {}", s)));
    }
    Ok(parts)
}

/// Plain decimal without sign or leading zeros
fn parse_decimal(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

fn parse_base(s: &str) -> AbiResult<AbiType> {
    match s {
        "address" => return Ok(AbiType::Address),
        "bool" => return Ok(AbiType::Bool),
        "bytes" => return Ok(AbiType::Bytes),
        "string" => return Ok(AbiType::String),
        "uint" => return Ok(AbiType::Uint(256)),
        "int" => return Ok(AbiType::Int(256)),
        _ => {}
    }

    if let Some(size) = s.strip_prefix("bytes") {
        let size = parse_decimal(size)
            .ok_or_else(|| AbiError::InvalidType(format!("Invalid bytes size: {}", s)))?;
        if size == 0 || size > 32 {
            return Err(AbiError::InvalidType(format!("bytes size must be 1-32: {}", s)));
        }
        return Ok(AbiType::FixedBytes(size));
    }

    if let Some(bits) = s.strip_prefix("uint") {
        return parse_bits(s, bits).map(AbiType::Uint);
    }

    if let Some(bits) = s.strip_prefix("int") {
        return parse_bits(s, bits).map(AbiType::Int);
    }

    Err(AbiError::InvalidType(format!("Unknown type: {}", s)))
}

fn parse_bits(full: &str, bits: &str) -> AbiResult<usize> {
    let bits = parse_decimal(bits)
        .ok_or_else(|| AbiError::InvalidType(format!("Invalid integer size: {}", full)))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::InvalidType(format!(
            "integer size must be a multiple of 8 in 8-256: {}",
            full
        )));
    }
    Ok(bits)
}

/// Function or constructor parameter as it appears in a JSON ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    /// Parameter name (can be empty)
    #[serde(default)]
    pub name: String,
    /// Type string, `tuple`-based for struct parameters (`tuple`, `tuple[]`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Tuple components (for tuple types)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            components: vec![],
        }
    }

    /// Struct parameter; `kind` is `tuple` optionally followed by array suffixes
    pub fn tuple(name: impl Into<String>, kind: impl Into<String>, components: Vec<AbiParam>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            components,
        }
    }

    /// Signature fragment, with `tuple` expanded from the components
    pub fn canonical_type(&self) -> AbiResult<String> {
        match self.kind.trim().strip_prefix("tuple") {
            Some(suffix) => {
                if self.components.is_empty() {
                    return Err(AbiError::InvalidType(format!(
                        "tuple parameter '{}' has no components",
                        self.name
                    )));
                }
                let inner = self
                    .components
                    .iter()
                    .map(|c| c.canonical_type())
                    .collect::<AbiResult<Vec<_>>>()?
                    .join(",");
                Ok(format!("({}){}", inner, suffix))
            }
            None => Ok(self.kind.trim().to_string()),
        }
    }

    /// Resolve into a type descriptor
    pub fn resolve(&self) -> AbiResult<AbiType> {
        self.resolve_with_limit(None)
    }

    /// Resolve with an optional bound on nesting depth
    pub fn resolve_with_limit(&self, max_depth: Option<usize>) -> AbiResult<AbiType> {
        AbiType::parse_with_limit(&self.canonical_type()?, max_depth)
    }
}

/// State mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    Nonpayable,
    Payable,
}
