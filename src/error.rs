//! Unified error types for the ABI codec
//!
//! Every fallible operation in the crate returns [`AbiResult`]. Errors are
//! raised at the point of failure and never retried: they describe malformed
//! input, not transient faults.

use serde::{Deserialize, Serialize};

/// Errors raised while parsing, encoding or decoding ABI data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    /// Type string does not follow the ABI type grammar
    #[error("Invalid type: {0}")]
    InvalidType(String),

    /// Buffer too short for a required read
    #[error("Insufficient data: need {needed} bytes at offset {offset}, have {available}")]
    InsufficientData {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A dynamic offset word does not fit the addressable range
    #[error("Invalid offset: {0}")]
    InvalidOffset(String),

    /// A length prefix does not fit the addressable range
    #[error("Invalid length: {0}")]
    InvalidLength(String),

    /// String payload is not valid UTF-8
    #[error("Invalid UTF-8 in string at offset {offset}: {reason}")]
    InvalidUtf8 { offset: usize, reason: String },

    /// Value or parameter type could not be resolved against the expected type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Literal value could not be constructed (bad hex, bad JSON shape, ...)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// JSON ABI document could not be interpreted
    #[error("Invalid ABI: {0}")]
    InvalidAbi(String),

    /// Numeric literal exceeds 256 bits
    #[error("Numeric overflow")]
    Overflow,
}

impl AbiError {
    /// Shorthand for a type mismatch between two displayable descriptions
    pub fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        AbiError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Stable category code, used by the CLI's JSON error output
    pub fn code(&self) -> ErrorCode {
        match self {
            AbiError::InvalidType(_) => ErrorCode::InvalidType,
            AbiError::InsufficientData { .. } => ErrorCode::InsufficientData,
            AbiError::InvalidOffset(_) => ErrorCode::InvalidOffset,
            AbiError::InvalidLength(_) => ErrorCode::InvalidLength,
            AbiError::InvalidUtf8 { .. } => ErrorCode::InvalidUtf8,
            AbiError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            AbiError::InvalidValue(_) => ErrorCode::InvalidValue,
            AbiError::InvalidAbi(_) => ErrorCode::InvalidAbi,
            AbiError::Overflow => ErrorCode::Overflow,
        }
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidType,
    InsufficientData,
    InvalidOffset,
    InvalidLength,
    InvalidUtf8,
    TypeMismatch,
    InvalidValue,
    InvalidAbi,
    Overflow,
}

/// Result type alias for codec operations
pub type AbiResult<T> = Result<T, AbiError>;

impl From<hex::FromHexError> for AbiError {
    fn from(e: hex::FromHexError) -> Self {
        AbiError::InvalidValue(format!("hex: {}", e))
    }
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::InvalidAbi(format!("JSON parse error: {}", e))
    }
}
