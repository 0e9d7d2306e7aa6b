//! Ethereum contract ABI codec
//!
//! # Architecture
//!
//! This crate provides:
//! - **abi::types**: type strings parsed into [`AbiType`] trees
//! - **abi::value**: the runtime value model, [`AbiValue`]
//! - **abi::encoder** / **abi::decoder**: Solidity head/tail encoding
//! - **abi::event**: event topics and log decoding
//! - **abi::parser**: JSON ABI documents
//! - **config**: explicit codec settings
//!
//! Everything is synchronous and pure: no I/O, no global codec state. The
//! only cryptographic primitive, keccak256, is injected through
//! [`abi::Keccak256`] and defaults to `tiny-keccak`.
//!
//! # Example
//!
//! ```rust
//! use abi_codec::abi::{decode, encode_call, AbiType, AbiValue};
//!
//! let calldata = encode_call(
//!     "transfer(address,uint256)",
//!     &[AbiValue::Address([0x11; 20]), AbiValue::uint256(1000)],
//! );
//! assert_eq!(hex::encode(&calldata[..4]), "a9059cbb");
//!
//! let values = decode(&[AbiType::Address, AbiType::Uint(256)], &calldata[4..]).unwrap();
//! assert_eq!(values[1].as_u64(), Some(1000));
//! ```

pub mod utils;

pub mod abi;
pub mod config;
pub mod error;

pub use abi::{AbiType, AbiValue, ContractAbi, EventCodec};
pub use config::CodecConfig;
pub use error::{AbiError, AbiResult, ErrorCode};
