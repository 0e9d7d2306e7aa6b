//! JSON ABI parser for Solidity contracts

use serde::Deserialize;

use super::event::{AbiEvent, EventCodec};
use super::function::{AbiErrorDef, AbiFunction, FunctionType};
use super::selector::TinyKeccak;
use super::types::{AbiParam, StateMutability};
use crate::config::CodecConfig;
use crate::error::{AbiError, AbiResult};
use crate::log_debug;

/// Parsed contract ABI
#[derive(Debug, Clone, Default)]
pub struct ContractAbi {
    /// Contract functions
    pub functions: Vec<AbiFunction>,
    /// Contract events
    pub events: Vec<AbiEvent>,
    /// Custom errors
    pub errors: Vec<AbiErrorDef>,
    /// Constructor (if present)
    pub constructor: Option<AbiFunction>,
    /// Fallback function
    pub fallback: Option<AbiFunction>,
    /// Receive function
    pub receive: Option<AbiFunction>,
    config: CodecConfig,
}

impl ContractAbi {
    /// Parse ABI from JSON string
    pub fn from_json(json: &str) -> AbiResult<Self> {
        Self::from_json_with_config(json, CodecConfig::default())
    }

    /// Parse ABI from JSON string under explicit settings
    pub fn from_json_with_config(json: &str, config: CodecConfig) -> AbiResult<Self> {
        let items: Vec<AbiItem> = serde_json::from_str(json)?;
        Self::from_items(items, config)
    }

    /// Parse ABI from JSON Value
    pub fn from_json_value(value: serde_json::Value) -> AbiResult<Self> {
        let items: Vec<AbiItem> = serde_json::from_value(value)?;
        Self::from_items(items, CodecConfig::default())
    }

    /// Build ABI from parsed items, checking that every parameter resolves
    fn from_items(items: Vec<AbiItem>, config: CodecConfig) -> AbiResult<Self> {
        let mut abi = ContractAbi {
            config,
            ..Default::default()
        };

        for item in items {
            match item {
                AbiItem::Function(f) => {
                    abi.check_params(&f.name, f.inputs.iter().chain(&f.outputs))?;
                    abi.functions.push(AbiFunction {
                        name: f.name,
                        inputs: f.inputs,
                        outputs: f.outputs,
                        state_mutability: f.state_mutability.unwrap_or_default(),
                        function_type: FunctionType::Function,
                    });
                }
                AbiItem::Event(e) => {
                    abi.check_params(&e.name, e.inputs.iter().map(|p| &p.param))?;
                    abi.events.push(e);
                }
                AbiItem::Error(e) => {
                    abi.check_params(&e.name, e.inputs.iter())?;
                    abi.errors.push(e);
                }
                AbiItem::Constructor(c) => {
                    abi.check_params("constructor", c.inputs.iter())?;
                    abi.constructor = Some(AbiFunction {
                        name: "constructor".to_string(),
                        inputs: c.inputs,
                        outputs: vec![],
                        state_mutability: c.state_mutability.unwrap_or_default(),
                        function_type: FunctionType::Constructor,
                    });
                }
                AbiItem::Fallback(f) => {
                    abi.fallback = Some(Self::special("fallback", f, FunctionType::Fallback));
                }
                AbiItem::Receive(f) => {
                    abi.receive = Some(Self::special("receive", f, FunctionType::Receive));
                }
            }
        }

        log_debug!("abi::parser", "Parsed contract ABI",
            functions = abi.functions.len(),
            events = abi.events.len(),
            errors = abi.errors.len()
        );
        Ok(abi)
    }

    fn special(name: &str, item: ParsedSpecial, function_type: FunctionType) -> AbiFunction {
        AbiFunction {
            name: name.to_string(),
            inputs: vec![],
            outputs: vec![],
            state_mutability: item.state_mutability.unwrap_or(StateMutability::Payable),
            function_type,
        }
    }

    fn check_params<'a>(
        &self,
        owner: &str,
        params: impl Iterator<Item = &'a AbiParam>,
    ) -> AbiResult<()> {
        for param in params {
            self.config.resolve_param(param).map_err(|e| {
                AbiError::InvalidAbi(format!("{}: parameter '{}': {}", owner, param.name, e))
            })?;
        }
        Ok(())
    }

    /// Get a function by name
    pub fn function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Get all functions with a given name (for overloaded functions)
    pub fn functions_by_name(&self, name: &str) -> Vec<&AbiFunction> {
        self.functions.iter().filter(|f| f.name == name).collect()
    }

    /// Get a function by selector
    pub fn function_by_selector(&self, selector: &[u8; 4]) -> Option<&AbiFunction> {
        self.functions
            .iter()
            .find(|f| f.selector().is_ok_and(|s| s == *selector))
    }

    /// Get an event by name
    pub fn event(&self, name: &str) -> Option<&AbiEvent> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Get an event by topic0
    pub fn event_by_topic(&self, topic: &[u8; 32]) -> Option<&AbiEvent> {
        self.events
            .iter()
            .find(|e| matches!(e.topic(), Ok(Some(t)) if t == *topic))
    }

    /// Get a custom error by selector
    pub fn error_by_selector(&self, selector: &[u8; 4]) -> Option<&AbiErrorDef> {
        self.errors
            .iter()
            .find(|e| e.selector().is_ok_and(|s| s == *selector))
    }

    /// Log codec for the named event, using this ABI's settings
    pub fn event_codec(&self, name: &str) -> AbiResult<EventCodec<TinyKeccak>> {
        let event = self
            .event(name)
            .ok_or_else(|| AbiError::InvalidAbi(format!("no event named {}", name)))?;
        EventCodec::with_config(event.clone(), TinyKeccak, self.config.clone())
    }
}

/// Raw ABI item for parsing
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum AbiItem {
    Function(ParsedFunction),
    Event(AbiEvent),
    Error(AbiErrorDef),
    Constructor(ParsedConstructor),
    Fallback(ParsedSpecial),
    Receive(ParsedSpecial),
}

/// Parsed function
#[derive(Debug, Clone, Deserialize)]
struct ParsedFunction {
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
    #[serde(rename = "stateMutability")]
    state_mutability: Option<StateMutability>,
}

/// Parsed constructor
#[derive(Debug, Clone, Deserialize)]
struct ParsedConstructor {
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(rename = "stateMutability")]
    state_mutability: Option<StateMutability>,
}

/// Parsed fallback or receive entry
#[derive(Debug, Clone, Deserialize)]
struct ParsedSpecial {
    #[serde(rename = "stateMutability")]
    state_mutability: Option<StateMutability>,
}
