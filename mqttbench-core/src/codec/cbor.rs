// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CBOR codec backed by ciborium.

use super::{Codec, Encoding};
use crate::error::CodecError;
use crate::payload::SensorReading;

/// Full-fidelity CBOR map mapping, same field names as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl Codec for CborCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Cbor
    }

    fn encode(&self, reading: &SensorReading) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(reading, &mut buf)
            .map_err(|e| CodecError::encode(Encoding::Cbor, e))?;
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<SensorReading, CodecError> {
        ciborium::de::from_reader(bytes).map_err(|e| CodecError::decode(Encoding::Cbor, e))
    }
}
