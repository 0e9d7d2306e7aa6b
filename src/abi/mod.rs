//! ABI (Application Binary Interface) module for Solidity/EVM contracts
//!
//! This module provides complete ABI encoding/decoding functionality:
//! - Type strings parsed into recursive [`AbiType`] trees
//! - A runtime value model ([`AbiValue`]) that encodes itself
//! - Head/tail encoding and bounds-checked decoding
//! - Function selectors, call data and custom errors
//! - Event topics and log decoding
//! - JSON ABI parsing
//!
//! keccak256 reaches the codec through the [`Keccak256`] trait, so callers
//! can supply their own implementation.

pub mod decoder;
pub mod encoder;
pub mod event;
pub mod function;
pub mod json;
pub mod parser;
pub mod selector;
pub mod types;
pub mod uint;
pub mod value;


pub use decoder::{decode, AbiDecoder};
pub use encoder::{encode, encode_call, AbiEncoder};
pub use event::{AbiEvent, DecodedLog, EventCodec, EventParam};
pub use function::{parse_signature, AbiErrorDef, AbiFunction, FunctionType};
pub use parser::ContractAbi;
pub use selector::{function_selector, AbiSelector, Keccak256, TinyKeccak};
pub use types::{AbiParam, AbiType, StateMutability, WORD_SIZE};
pub use uint::U256;
pub use value::AbiValue;
