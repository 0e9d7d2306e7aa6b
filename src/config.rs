//! Codec configuration
//!
//! Configuration is always passed explicitly to the components that read
//! it; there is no global codec state. Presets:
//! - `permissive` (default): missing indexed topics are omitted from decoded logs
//! - `strict`: missing topics are errors, type nesting and decoded output
//!   are bounded

use serde::{Deserialize, Serialize};

use crate::abi::decoder::AbiDecoder;
use crate::abi::types::{AbiParam, AbiType};
use crate::abi::value::AbiValue;
use crate::error::AbiResult;
use crate::utils::logging;

/// Nesting bound used by the strict preset
pub const STRICT_MAX_TYPE_DEPTH: usize = 16;

/// Decoded output ceiling used by the strict preset (16 MiB)
pub const STRICT_MAX_DECODED_BYTES: usize = 16 * 1024 * 1024;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigPreset {
    Permissive,
    Strict,
    /// User-adjusted settings
    Custom,
}

/// Codec settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub preset: ConfigPreset,
    /// A log missing the topic of an indexed parameter fails with
    /// `InsufficientData` instead of omitting that parameter
    pub strict_topics: bool,
    /// Emit debug-level log records
    pub debug_logging: bool,
    /// Maximum array/tuple nesting depth of parsed types (`None` = unbounded)
    pub max_type_depth: Option<usize>,
    /// Ceiling on decoded output in bytes (`None` = unbounded)
    pub max_decoded_bytes: Option<usize>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::permissive()
    }
}

impl CodecConfig {
    /// Permissive preset
    pub fn permissive() -> Self {
        Self {
            preset: ConfigPreset::Permissive,
            strict_topics: false,
            debug_logging: false,
            max_type_depth: None,
            max_decoded_bytes: None,
        }
    }

    /// Strict preset
    pub fn strict() -> Self {
        Self {
            preset: ConfigPreset::Strict,
            strict_topics: true,
            debug_logging: false,
            max_type_depth: Some(STRICT_MAX_TYPE_DEPTH),
            max_decoded_bytes: Some(STRICT_MAX_DECODED_BYTES),
        }
    }

    /// Load settings from JSON; absent fields take permissive defaults
    pub fn from_json(json: &str) -> AbiResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Toggle strict topic handling
    pub fn with_strict_topics(mut self, strict: bool) -> Self {
        self.strict_topics = strict;
        self.preset = ConfigPreset::Custom;
        self
    }

    /// Set the nesting bound
    pub fn with_max_type_depth(mut self, depth: Option<usize>) -> Self {
        self.max_type_depth = depth;
        self.preset = ConfigPreset::Custom;
        self
    }

    /// Set the decoded output ceiling
    pub fn with_max_decoded_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_decoded_bytes = limit;
        self.preset = ConfigPreset::Custom;
        self
    }

    /// Toggle debug logging
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Validate settings, returning warnings for questionable combinations
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.max_type_depth == Some(0) {
            warnings.push("Warning: max_type_depth of 0 rejects every array and tuple".to_string());
        }

        if self.strict_topics && self.max_type_depth.is_none() {
            warnings.push("Warning: strict topics enabled with unbounded type nesting".to_string());
        }

        if self.preset == ConfigPreset::Strict && self.debug_logging {
            warnings.push("Warning: debug logging writes payload prefixes to stderr".to_string());
        }

        warnings
    }

    /// Push the logging switch into the process-wide logger
    pub fn apply_logging(&self) {
        if self.debug_logging {
            logging::enable_debug();
        } else {
            logging::disable_debug();
        }
    }

    /// Parse a type string under this configuration's nesting bound
    pub fn parse_type(&self, s: &str) -> AbiResult<AbiType> {
        AbiType::parse_with_limit(s, self.max_type_depth)
    }

    /// Decode a parameter list under this configuration's output ceiling
    pub fn decode(&self, types: &[AbiType], data: &[u8]) -> AbiResult<Vec<AbiValue>> {
        AbiDecoder::decode_with_limit(types, data, self.max_decoded_bytes)
    }

    /// Resolve a JSON ABI parameter under this configuration's nesting bound
    pub fn resolve_param(&self, param: &AbiParam) -> AbiResult<AbiType> {
        param.resolve_with_limit(self.max_type_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::uint::U256;

    #[test]
    fn test_presets() {
        let permissive = CodecConfig::default();
        assert_eq!(permissive.preset, ConfigPreset::Permissive);
        assert!(!permissive.strict_topics);
        assert!(permissive.validate().is_empty());

        let strict = CodecConfig::strict();
        assert!(strict.strict_topics);
        assert_eq!(strict.max_type_depth, Some(STRICT_MAX_TYPE_DEPTH));
        assert!(strict.validate().is_empty());
    }

    #[test]
    fn test_builders_mark_custom() {
        let config = CodecConfig::permissive().with_strict_topics(true);
        assert_eq!(config.preset, ConfigPreset::Custom);
        assert_eq!(config.validate().len(), 1);
        assert_eq!(CodecConfig::strict().with_max_type_depth(Some(0)).validate().len(), 1);
    }

    #[test]
    fn test_parse_type_depth() {
        let config = CodecConfig::permissive().with_max_type_depth(Some(2));
        assert!(config.parse_type("uint256[][]").is_ok());
        assert!(config.parse_type("uint256[][][]").is_err());
        assert!(CodecConfig::permissive().parse_type("uint256[][][]").is_ok());
    }

    #[test]
    fn test_decode_output_ceiling() {
        let types = AbiType::parse_list("string").unwrap();
        let mut data = U256::from_u64(32).to_be_bytes().to_vec();
        data.extend_from_slice(&U256::from_u64(64).to_be_bytes());
        data.extend_from_slice(&[b'a'; 64]);

        assert!(CodecConfig::permissive().decode(&types, &data).is_ok());
        assert!(CodecConfig::strict().decode(&types, &data).is_ok());

        let tight = CodecConfig::permissive().with_max_decoded_bytes(Some(64));
        assert_eq!(tight.preset, ConfigPreset::Custom);
        assert!(matches!(
            tight.decode(&types, &data),
            Err(crate::error::AbiError::InvalidLength(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let config = CodecConfig::from_json(r#"{"strict_topics": true}"#).unwrap();
        assert!(config.strict_topics);
        assert_eq!(config.max_type_depth, None);
        assert_eq!(config.max_decoded_bytes, None);
        assert!(CodecConfig::from_json("not json").is_err());
    }
}
