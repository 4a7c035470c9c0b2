// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `protobuf` selector. There is no protobuf schema on the wire: the codec
//! delegates both directions to [`JsonCodec`].

use super::{Codec, Encoding, JsonCodec};
use crate::error::CodecError;
use crate::payload::SensorReading;

/// Protobuf tag whose bytes are JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufFallbackCodec {
    inner: JsonCodec,
}

impl ProtobufFallbackCodec {
    pub fn new() -> Self {
        Self { inner: JsonCodec }
    }
}

impl Codec for ProtobufFallbackCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Protobuf
    }

    fn encode(&self, reading: &SensorReading) -> Result<Vec<u8>, CodecError> {
        self.inner.encode(reading)
    }

    fn decode(&self, bytes: &[u8]) -> Result<SensorReading, CodecError> {
        self.inner.decode(bytes)
    }
}
