// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON codec backed by serde_json.

use super::{Codec, Encoding};
use crate::error::CodecError;
use crate::payload::SensorReading;

/// Full-fidelity JSON object mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Json
    }

    fn encode(&self, reading: &SensorReading) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(reading).map_err(|e| CodecError::encode(Encoding::Json, e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<SensorReading, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::decode(Encoding::Json, e))
    }
}
