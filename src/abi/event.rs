//! Event descriptors and log topic/data codec

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::decoder::AbiDecoder;
use super::encoder::AbiEncoder;
use super::selector::{AbiSelector, Keccak256, TinyKeccak};
use super::types::{AbiParam, AbiType};
use super::value::AbiValue;
use crate::config::CodecConfig;
use crate::error::{AbiError, AbiResult};
use crate::utils::crypto::encode_hex;
use crate::{log_debug, log_warn};

/// Event parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParam {
    #[serde(flatten)]
    pub param: AbiParam,
    /// Stored in a topic rather than in the data section
    #[serde(default)]
    pub indexed: bool,
}

impl EventParam {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, indexed: bool) -> Self {
        Self {
            param: AbiParam::new(name, kind),
            indexed,
        }
    }

    pub fn name(&self) -> &str {
        &self.param.name
    }
}

/// Event definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEvent {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<EventParam>,
    /// Anonymous events carry no signature topic
    #[serde(default)]
    pub anonymous: bool,
}

impl AbiEvent {
    pub fn new(name: impl Into<String>, inputs: Vec<EventParam>, anonymous: bool) -> Self {
        Self {
            name: name.into(),
            inputs,
            anonymous,
        }
    }

    /// Event signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> AbiResult<String> {
        let types = self
            .inputs
            .iter()
            .map(|p| p.param.canonical_type())
            .collect::<AbiResult<Vec<_>>>()?;
        Ok(format!("{}({})", self.name, types.join(",")))
    }

    /// Signature topic; `None` for anonymous events
    pub fn topic(&self) -> AbiResult<Option<[u8; 32]>> {
        if self.anonymous {
            return Ok(None);
        }
        Ok(Some(AbiSelector::topic_from_signature(&self.signature()?)))
    }
}

/// Named values of a decoded log, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedLog {
    pub params: Vec<(String, AbiValue)>,
}

impl DecodedLog {
    /// Value of the first parameter with this name
    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AbiValue)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Name-keyed map (declaration order is lost)
    pub fn into_map(self) -> HashMap<String, AbiValue> {
        self.params.into_iter().collect()
    }

    /// JSON object of name to rendered value
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .params
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

/// Encodes topics for and decodes logs of a single event.
///
/// Parameter types are resolved once, when the codec is built.
#[derive(Debug, Clone)]
pub struct EventCodec<H: Keccak256 = TinyKeccak> {
    event: AbiEvent,
    types: Vec<AbiType>,
    signature: String,
    topic: Option<[u8; 32]>,
    config: CodecConfig,
    hasher: H,
}

impl EventCodec<TinyKeccak> {
    /// Codec with the default hasher and permissive settings
    pub fn new(event: AbiEvent) -> AbiResult<Self> {
        Self::with_config(event, TinyKeccak, CodecConfig::default())
    }
}

impl<H: Keccak256> EventCodec<H> {
    /// Codec with an injected hasher
    pub fn with_hasher(event: AbiEvent, hasher: H) -> AbiResult<Self> {
        Self::with_config(event, hasher, CodecConfig::default())
    }

    /// Codec with an injected hasher and explicit settings
    pub fn with_config(event: AbiEvent, hasher: H, config: CodecConfig) -> AbiResult<Self> {
        let types = event
            .inputs
            .iter()
            .map(|p| {
                config
                    .resolve_param(&p.param)
                    .map_err(|e| AbiError::mismatch(p.param.kind.clone(), e.to_string()))
            })
            .collect::<AbiResult<Vec<_>>>()?;

        let signature = event
            .signature()
            .map_err(|e| AbiError::mismatch(format!("signature of {}", event.name), e.to_string()))?;
        let topic = if event.anonymous {
            None
        } else {
            Some(AbiSelector::topic_with(&hasher, &signature))
        };

        Ok(Self {
            event,
            types,
            signature,
            topic,
            config,
            hasher,
        })
    }

    pub fn event(&self) -> &AbiEvent {
        &self.event
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Signature topic (topic 0); `None` for anonymous events
    pub fn topic(&self) -> Option<[u8; 32]> {
        self.topic
    }

    /// Topic filter for the given indexed values.
    ///
    /// `values[i]` belongs to the i-th indexed parameter; `None` (or a
    /// missing entry) leaves that position as a wildcard.
    pub fn encode_topics(&self, values: &[Option<AbiValue>]) -> Vec<Option<[u8; 32]>> {
        let mut topics = Vec::new();
        if let Some(topic) = self.topic {
            topics.push(Some(topic));
        }

        let indexed = self.event.inputs.iter().filter(|p| p.indexed).count();
        for i in 0..indexed {
            let topic = values
                .get(i)
                .and_then(Option::as_ref)
                .map(|value| self.topic_for_value(value));
            topics.push(topic);
        }
        topics
    }

    /// Topic word of a single indexed value
    pub fn topic_for_value(&self, value: &AbiValue) -> [u8; 32] {
        if value.is_hashed_in_topic() {
            return self.hasher.keccak256(&AbiEncoder::encode(value));
        }
        match AbiEncoder::static_word(value) {
            Some(word) => word,
            None => self.hasher.keccak256(&AbiEncoder::encode(value)),
        }
    }

    /// Decode a log into named values, in declaration order.
    ///
    /// Indexed parameters of hashed kinds come back as the raw 32-byte topic.
    /// An indexed parameter whose topic is missing is left out, or rejected
    /// with `InsufficientData` when `strict_topics` is configured.
    pub fn decode_log(&self, topics: &[[u8; 32]], data: &[u8]) -> AbiResult<DecodedLog> {
        log_debug!("abi::event", "Decoding log",
            event = self.signature,
            topics = topics.len(),
            data = encode_hex(data)
        );

        let mut cursor = if self.event.anonymous { 0 } else { 1 };
        let mut indexed_values: Vec<Option<AbiValue>> = Vec::new();
        let mut data_types = Vec::new();

        for (param, abi_type) in self.event.inputs.iter().zip(&self.types) {
            if !param.indexed {
                data_types.push(abi_type.clone());
                continue;
            }

            match topics.get(cursor) {
                Some(topic) => {
                    let value = if abi_type.is_hashed_in_topic() {
                        AbiValue::FixedBytes(topic.to_vec())
                    } else {
                        AbiDecoder::decode_value(abi_type, topic, 0)?
                    };
                    indexed_values.push(Some(value));
                }
                None if self.config.strict_topics => {
                    return Err(AbiError::InsufficientData {
                        offset: cursor,
                        needed: 1,
                        available: topics.len(),
                    });
                }
                None => {
                    log_warn!("abi::event", "Missing topic for indexed parameter",
                        event = self.signature,
                        param = param.name(),
                        topic_index = cursor
                    );
                    indexed_values.push(None);
                }
            }
            cursor += 1;
        }

        let data_values = if data_types.is_empty() || data.is_empty() {
            Vec::new()
        } else {
            AbiDecoder::decode_with_limit(&data_types, data, self.config.max_decoded_bytes)?
        };

        let mut indexed_values = indexed_values.into_iter();
        let mut data_values = data_values.into_iter();
        let mut params = Vec::with_capacity(self.event.inputs.len());
        for param in &self.event.inputs {
            let value = if param.indexed {
                indexed_values.next().flatten()
            } else {
                data_values.next()
            };
            if let Some(value) = value {
                params.push((param.name().to_string(), value));
            }
        }

        Ok(DecodedLog { params })
    }

    /// Whether a log's topics plausibly belong to this event: topic 0 must
    /// match for named events, anonymous events need one topic per indexed
    /// parameter.
    pub fn matches(&self, topics: &[[u8; 32]]) -> bool {
        match self.topic {
            Some(topic) => topics.first() == Some(&topic),
            None => topics.len() == self.event.inputs.iter().filter(|p| p.indexed).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::uint::U256;
    use crate::utils::crypto::keccak256;

    fn transfer_event() -> AbiEvent {
        AbiEvent::new(
            "Transfer",
            vec![
                EventParam::new("from", "address", true),
                EventParam::new("to", "address", true),
                EventParam::new("value", "uint256", false),
            ],
            false,
        )
    }

    fn address_topic(addr: [u8; 20]) -> [u8; 32] {
        let mut topic = [0u8; 32];
        topic[12..].copy_from_slice(&addr);
        topic
    }

    #[test]
    fn test_transfer_signature_and_topic() {
        let codec = EventCodec::new(transfer_event()).unwrap();
        assert_eq!(codec.signature(), "Transfer(address,address,uint256)");
        assert_eq!(
            hex::encode(codec.topic().unwrap()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(transfer_event().topic().unwrap(), codec.topic());
    }

    #[test]
    fn test_encode_topics() {
        let codec = EventCodec::new(transfer_event()).unwrap();
        let topics = codec.encode_topics(&[
            Some(AbiValue::Address([1; 20])),
            Some(AbiValue::Address([2; 20])),
        ]);

        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0], codec.topic());
        assert_eq!(topics[1], Some(address_topic([1; 20])));
        assert_eq!(topics[2], Some(address_topic([2; 20])));
    }

    #[test]
    fn test_encode_topics_wildcards() {
        let codec = EventCodec::new(transfer_event()).unwrap();
        let topics = codec.encode_topics(&[None, Some(AbiValue::Address([2; 20]))]);
        assert_eq!(topics, vec![codec.topic(), None, Some(address_topic([2; 20]))]);

        let topics = codec.encode_topics(&[]);
        assert_eq!(topics, vec![codec.topic(), None, None]);
    }

    #[test]
    fn test_hashed_indexed_string() {
        let event = AbiEvent::new("Named", vec![EventParam::new("name", "string", true)], false);
        let codec = EventCodec::new(event).unwrap();
        let value = AbiValue::String("alice".into());
        let topics = codec.encode_topics(&[Some(value.clone())]);
        assert_eq!(topics[1], Some(keccak256(&value.encode())));

        let decoded = codec.decode_log(&[codec.topic().unwrap(), keccak256(b"x")], &[]).unwrap();
        assert_eq!(decoded.get("name"), Some(&AbiValue::FixedBytes(keccak256(b"x").to_vec())));
    }

    #[test]
    fn test_anonymous_event() {
        let event = AbiEvent::new("Anon", vec![EventParam::new("id", "uint256", true)], true);
        let codec = EventCodec::new(event).unwrap();
        assert_eq!(codec.topic(), None);

        let topics = codec.encode_topics(&[Some(AbiValue::uint256(9))]);
        assert_eq!(topics, vec![Some(U256::from_u64(9).to_be_bytes())]);

        let decoded = codec.decode_log(&[U256::from_u64(9).to_be_bytes()], &[]).unwrap();
        assert_eq!(decoded.get("id"), Some(&AbiValue::uint256(9)));
        assert!(codec.matches(&[[0u8; 32]]));
        assert!(!codec.matches(&[]));
    }

    #[test]
    fn test_decode_transfer_log() {
        let codec = EventCodec::new(transfer_event()).unwrap();
        let topics = [
            codec.topic().unwrap(),
            address_topic([0xaa; 20]),
            address_topic([0xbb; 20]),
        ];
        let data = U256::from_u64(1000).to_be_bytes();

        assert!(codec.matches(&topics));
        let decoded = codec.decode_log(&topics, &data).unwrap();
        let names: Vec<&str> = decoded.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["from", "to", "value"]);
        assert_eq!(decoded.get("from"), Some(&AbiValue::Address([0xaa; 20])));
        assert_eq!(decoded.get("value").and_then(|v| v.as_u64()), Some(1000));
    }

    #[test]
    fn test_decode_string_from_data() {
        let event = AbiEvent::new("Message", vec![EventParam::new("text", "string", false)], false);
        let codec = EventCodec::new(event).unwrap();
        let data = AbiValue::Tuple(vec![AbiValue::String("hello".into())]).encode();

        let decoded = codec.decode_log(&[codec.topic().unwrap()], &data).unwrap();
        assert_eq!(decoded.get("text").and_then(|v| v.as_str()), Some("hello"));
    }

    #[test]
    fn test_missing_topic_permissive() {
        let codec = EventCodec::new(transfer_event()).unwrap();
        let topics = [codec.topic().unwrap(), address_topic([0xaa; 20])];
        let data = U256::from_u64(5).to_be_bytes();

        let decoded = codec.decode_log(&topics, &data).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!(decoded.get("to").is_none());
        assert!(decoded.get("value").is_some());
    }

    #[test]
    fn test_missing_topic_strict() {
        let codec =
            EventCodec::with_config(transfer_event(), TinyKeccak, CodecConfig::strict()).unwrap();
        let topics = [codec.topic().unwrap(), address_topic([0xaa; 20])];
        let err = codec.decode_log(&topics, &[]).unwrap_err();
        assert!(matches!(err, AbiError::InsufficientData { offset: 2, .. }));
    }

    #[test]
    fn test_empty_data_skips_non_indexed() {
        let codec = EventCodec::new(transfer_event()).unwrap();
        let topics = [
            codec.topic().unwrap(),
            address_topic([1; 20]),
            address_topic([2; 20]),
        ];
        let decoded = codec.decode_log(&topics, &[]).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!(decoded.into_map().contains_key("to"));
    }

    #[test]
    fn test_indexed_fixed_array_is_hashed() {
        let event = AbiEvent::new("Batch", vec![EventParam::new("ids", "uint256[2]", true)], false);
        let codec = EventCodec::new(event).unwrap();
        let ids = AbiValue::FixedArray(vec![AbiValue::uint256(1), AbiValue::uint256(2)]);

        let mut packed = U256::from_u64(1).to_be_bytes().to_vec();
        packed.extend_from_slice(&U256::from_u64(2).to_be_bytes());
        let expected = crate::utils::crypto::keccak256(&packed);
        assert_eq!(
            codec.encode_topics(&[Some(ids)]),
            vec![codec.topic(), Some(expected)]
        );

        // The topic is returned as-is, not decoded back into the array
        let decoded = codec.decode_log(&[codec.topic().unwrap(), expected], &[]).unwrap();
        assert_eq!(decoded.get("ids"), Some(&AbiValue::FixedBytes(expected.to_vec())));
    }

    #[test]
    fn test_tuple_components_in_signature() {
        let mut order = EventParam::new("orders", "tuple[]", false);
        order.param.components = vec![AbiParam::new("id", "uint256"), AbiParam::new("maker", "address")];
        let event = AbiEvent::new("Filled", vec![order], false);
        let codec = EventCodec::new(event).unwrap();
        assert_eq!(codec.signature(), "Filled((uint256,address)[])");
    }

    #[test]
    fn test_unresolvable_type() {
        let event = AbiEvent::new("Bad", vec![EventParam::new("x", "uint7", false)], false);
        assert!(matches!(EventCodec::new(event), Err(AbiError::TypeMismatch { .. })));
    }

    #[test]
    fn test_injected_hasher() {
        let hasher = |_: &[u8]| -> [u8; 32] { [0x11; 32] };
        let codec = EventCodec::with_hasher(transfer_event(), hasher).unwrap();
        assert_eq!(codec.topic(), Some([0x11; 32]));
    }

    #[test]
    fn test_event_json_roundtrip_fields() {
        let json = r#"{"name":"Transfer","inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256"}
        ]}"#;
        let event: AbiEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, transfer_event());
        assert!(!event.anonymous);
    }

    #[test]
    fn test_decoded_log_json() {
        let log = DecodedLog {
            params: vec![("value".to_string(), AbiValue::uint256(7))],
        };
        assert_eq!(log.to_json(), serde_json::json!({"value": "7"}));
    }
}
