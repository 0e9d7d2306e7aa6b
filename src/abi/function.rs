//! Function and custom error descriptors

use serde::{Deserialize, Serialize};

use super::decoder::AbiDecoder;
use super::encoder::AbiEncoder;
use super::selector::AbiSelector;
use super::types::{AbiParam, AbiType, StateMutability};
use super::value::AbiValue;
use crate::error::{AbiError, AbiResult};
use crate::utils::crypto::encode_hex;

/// Function kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    #[default]
    Function,
    Constructor,
    Fallback,
    Receive,
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiFunction {
    /// Function name
    pub name: String,
    /// Input parameters
    pub inputs: Vec<AbiParam>,
    /// Output parameters
    pub outputs: Vec<AbiParam>,
    /// State mutability
    pub state_mutability: StateMutability,
    /// Function type
    pub function_type: FunctionType,
}

impl AbiFunction {
    pub fn new(name: impl Into<String>, inputs: Vec<AbiParam>, outputs: Vec<AbiParam>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability: StateMutability::default(),
            function_type: FunctionType::Function,
        }
    }

    /// Build from a signature such as `transfer(address,uint256)`.
    /// Parameter types are normalized (`uint` becomes `uint256`).
    pub fn from_signature(signature: &str) -> AbiResult<Self> {
        let (name, types) = parse_signature(signature)?;
        let inputs = types
            .iter()
            .map(|t| AbiParam::new("", t.canonical_name()))
            .collect();
        Ok(Self::new(name, inputs, vec![]))
    }

    /// Get the function signature for selector calculation
    pub fn signature(&self) -> AbiResult<String> {
        signature_of(&self.name, &self.inputs)
    }

    /// 4-byte selector
    pub fn selector(&self) -> AbiResult<[u8; 4]> {
        Ok(AbiSelector::selector_from_signature(&self.signature()?))
    }

    pub fn input_types(&self) -> AbiResult<Vec<AbiType>> {
        resolve_all(&self.inputs)
    }

    pub fn output_types(&self) -> AbiResult<Vec<AbiType>> {
        resolve_all(&self.outputs)
    }

    /// Calldata for a call with these arguments: selector followed by the
    /// encoded arguments (no selector for constructors).
    pub fn encode_input(&self, args: &[AbiValue]) -> AbiResult<Vec<u8>> {
        let types = self.input_types()?;
        check_arguments(&types, args)?;

        if self.function_type == FunctionType::Constructor {
            return Ok(AbiEncoder::encode_sequence(args));
        }
        Ok(AbiEncoder::encode_call(&self.signature()?, args))
    }

    /// Decode calldata produced by [`AbiFunction::encode_input`]
    pub fn decode_input(&self, calldata: &[u8]) -> AbiResult<Vec<AbiValue>> {
        let params = strip_selector(&self.selector()?, calldata)?;
        AbiDecoder::decode(&self.input_types()?, params)
    }

    /// Decode return data
    pub fn decode_output(&self, data: &[u8]) -> AbiResult<Vec<AbiValue>> {
        AbiDecoder::decode(&self.output_types()?, data)
    }
}

/// Custom error definition (`error InsufficientBalance(uint256 available)`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiErrorDef {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
}

impl AbiErrorDef {
    pub fn new(name: impl Into<String>, inputs: Vec<AbiParam>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    pub fn signature(&self) -> AbiResult<String> {
        signature_of(&self.name, &self.inputs)
    }

    pub fn selector(&self) -> AbiResult<[u8; 4]> {
        Ok(AbiSelector::selector_from_signature(&self.signature()?))
    }

    /// Revert data for this error
    pub fn encode(&self, args: &[AbiValue]) -> AbiResult<Vec<u8>> {
        check_arguments(&resolve_all(&self.inputs)?, args)?;
        Ok(AbiEncoder::encode_call(&self.signature()?, args))
    }

    /// Decode revert data (selector-checked)
    pub fn decode(&self, data: &[u8]) -> AbiResult<Vec<AbiValue>> {
        let params = strip_selector(&self.selector()?, data)?;
        AbiDecoder::decode(&resolve_all(&self.inputs)?, params)
    }
}

/// Split `name(t1,t2,...)` into its name and parameter types
pub fn parse_signature(signature: &str) -> AbiResult<(String, Vec<AbiType>)> {
    let signature = signature.trim();
    let start = signature
        .find('(')
        .ok_or_else(|| AbiError::InvalidType(format!("Missing '(' in signature: {}", signature)))?;
    let params = signature[start..]
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| AbiError::InvalidType(format!("Missing ')' in signature: {}", signature)))?;

    let name = signature[..start].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return Err(AbiError::InvalidType(format!("Invalid name in signature: {}", signature)));
    }

    Ok((name.to_string(), AbiType::parse_list(params)?))
}

fn signature_of(name: &str, params: &[AbiParam]) -> AbiResult<String> {
    let types = params
        .iter()
        .map(|p| p.canonical_type())
        .collect::<AbiResult<Vec<_>>>()?;
    Ok(format!("{}({})", name, types.join(",")))
}

fn resolve_all(params: &[AbiParam]) -> AbiResult<Vec<AbiType>> {
    params.iter().map(|p| p.resolve()).collect()
}

fn check_arguments(types: &[AbiType], args: &[AbiValue]) -> AbiResult<()> {
    if types.len() != args.len() {
        return Err(AbiError::mismatch(
            format!("{} arguments", types.len()),
            format!("{} arguments", args.len()),
        ));
    }
    for (abi_type, arg) in types.iter().zip(args) {
        if !arg.conforms_to(abi_type) {
            return Err(AbiError::mismatch(abi_type.canonical_name(), arg.describe()));
        }
    }
    Ok(())
}

fn strip_selector<'a>(selector: &[u8; 4], data: &'a [u8]) -> AbiResult<&'a [u8]> {
    if data.len() < 4 {
        return Err(AbiError::InsufficientData {
            offset: 0,
            needed: 4,
            available: data.len(),
        });
    }
    let (head, params) = data.split_at(4);
    if head != selector {
        return Err(AbiError::mismatch(encode_hex(selector), encode_hex(head)));
    }
    Ok(params)
}
