// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Wire codecs for [`SensorReading`] payloads.
//!
//! Every format implements the [`Codec`] trait. [`CodecRegistry`] maps an
//! [`Encoding`] tag to its codec, so callers never branch on the format.
//!
//! | Encoding   | Fidelity                                  |
//! |------------|-------------------------------------------|
//! | `json`     | all fields present on the reading         |
//! | `cbor`     | all fields present on the reading         |
//! | `msgpack`  | the five core fields only                 |
//! | `protobuf` | identical to `json` (fallback)            |

mod cbor;
mod json;
mod msgpack;
mod protobuf;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, CodecError};
use crate::payload::SensorReading;

pub use cbor::CborCodec;
pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;
pub use protobuf::ProtobufFallbackCodec;

/// Wire format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Json,
    Cbor,
    #[serde(rename = "msgpack")]
    MsgPack,
    Protobuf,
}

impl Encoding {
    /// All supported encodings.
    pub const ALL: [Encoding; 4] = [
        Encoding::Json,
        Encoding::Cbor,
        Encoding::MsgPack,
        Encoding::Protobuf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Cbor => "cbor",
            Encoding::MsgPack => "msgpack",
            Encoding::Protobuf => "protobuf",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Encoding::Json),
            "cbor" => Ok(Encoding::Cbor),
            "msgpack" => Ok(Encoding::MsgPack),
            "protobuf" => Ok(Encoding::Protobuf),
            _ => Err(BenchError::UnsupportedEncoding {
                name: s.to_string(),
            }),
        }
    }
}

/// An encode/decode pair for one wire format.
pub trait Codec: Send + Sync {
    /// The tag this codec is registered under.
    fn encoding(&self) -> Encoding;

    /// Serialize a reading to bytes.
    fn encode(&self, reading: &SensorReading) -> Result<Vec<u8>, CodecError>;

    /// Reconstruct a reading from bytes.
    fn decode(&self, bytes: &[u8]) -> Result<SensorReading, CodecError>;
}

/// Registry of codecs keyed by encoding tag.
///
/// Lookups hand out shared handles, so a caller can hold its codec for a
/// whole run after the registry is gone.
pub struct CodecRegistry {
    codecs: HashMap<Encoding, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registry holding every built-in codec.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(JsonCodec));
        registry.register(Arc::new(CborCodec));
        registry.register(Arc::new(MsgPackCodec));
        registry.register(Arc::new(ProtobufFallbackCodec::new()));
        registry
    }

    /// Register a codec under its own tag, replacing any previous entry.
    pub fn register(&mut self, codec: Arc<dyn Codec>) {
        self.codecs.insert(codec.encoding(), codec);
    }

    /// Look up the codec for `encoding`.
    pub fn get(&self, encoding: Encoding) -> Result<Arc<dyn Codec>, BenchError> {
        self.codecs
            .get(&encoding)
            .map(Arc::clone)
            .ok_or_else(|| BenchError::UnsupportedEncoding {
                name: encoding.to_string(),
            })
    }

    /// Resolve an encoding name straight to its codec.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Codec>, BenchError> {
        self.get(name.parse()?)
    }

    /// Registered encodings in declaration order.
    pub fn encodings(&self) -> Vec<Encoding> {
        Encoding::ALL
            .into_iter()
            .filter(|e| self.codecs.contains_key(e))
            .collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Codec for `encoding` from the standard registry.
pub fn codec_for(encoding: Encoding) -> Result<Arc<dyn Codec>, BenchError> {
    CodecRegistry::standard().get(encoding)
}
