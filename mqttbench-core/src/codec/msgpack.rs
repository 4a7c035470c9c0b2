// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! MessagePack codec.
//!
//! Encodes a fixed five-entry map of the core fields. Optional fields are
//! never written, whatever the payload tier. Decode walks the map header's
//! declared entry count and dispatches on key name; keys it does not know are
//! skipped along with their values.

use rmpv::Value;

use super::{Codec, Encoding};
use crate::error::CodecError;
use crate::payload::SensorReading;

/// Number of entries in every encoded map.
pub const CORE_FIELD_COUNT: u32 = 5;

/// Nesting limit for skipped values. Core fields are flat.
const MAX_VALUE_DEPTH: usize = 32;

/// Core-fields-only MessagePack mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

fn encode_err(e: impl ToString) -> CodecError {
    CodecError::encode(Encoding::MsgPack, e)
}

fn decode_err(e: impl ToString) -> CodecError {
    CodecError::decode(Encoding::MsgPack, e)
}

impl Codec for MsgPackCodec {
    fn encoding(&self) -> Encoding {
        Encoding::MsgPack
    }

    fn encode(&self, reading: &SensorReading) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::with_capacity(64 + reading.sensor_id.len());

        rmp::encode::write_map_len(&mut buf, CORE_FIELD_COUNT).map_err(encode_err)?;

        rmp::encode::write_str(&mut buf, "timestamp").map_err(encode_err)?;
        rmp::encode::write_f64(&mut buf, reading.timestamp).map_err(encode_err)?;

        rmp::encode::write_str(&mut buf, "sensor_id").map_err(encode_err)?;
        rmp::encode::write_str(&mut buf, &reading.sensor_id).map_err(encode_err)?;

        rmp::encode::write_str(&mut buf, "temperature").map_err(encode_err)?;
        rmp::encode::write_f64(&mut buf, reading.temperature).map_err(encode_err)?;

        rmp::encode::write_str(&mut buf, "humidity").map_err(encode_err)?;
        rmp::encode::write_f64(&mut buf, reading.humidity).map_err(encode_err)?;

        rmp::encode::write_str(&mut buf, "pressure").map_err(encode_err)?;
        rmp::encode::write_f64(&mut buf, reading.pressure).map_err(encode_err)?;

        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<SensorReading, CodecError> {
        let mut rd = bytes;
        let entries = rmp::decode::read_map_len(&mut rd)
            .map_err(|e| decode_err(format!("expected map header: {}", e)))?;

        let mut timestamp = None;
        let mut sensor_id = None;
        let mut temperature = None;
        let mut humidity = None;
        let mut pressure = None;

        for _ in 0..entries {
            let key = rmpv::decode::read_value_with_max_depth(&mut rd, MAX_VALUE_DEPTH)
                .map_err(decode_err)?;
            let value = rmpv::decode::read_value_with_max_depth(&mut rd, MAX_VALUE_DEPTH)
                .map_err(decode_err)?;

            let key = match key {
                Value::String(s) => s
                    .into_str()
                    .ok_or_else(|| decode_err("map key is not valid UTF-8"))?,
                other => return Err(decode_err(format!("non-string map key: {}", other))),
            };

            match key.as_str() {
                "timestamp" => timestamp = Some(number(&key, &value)?),
                "sensor_id" => sensor_id = Some(text(&key, value)?),
                "temperature" => temperature = Some(number(&key, &value)?),
                "humidity" => humidity = Some(number(&key, &value)?),
                "pressure" => pressure = Some(number(&key, &value)?),
                // unknown key, value already consumed
                _ => {}
            }
        }

        Ok(SensorReading::core(
            timestamp.ok_or_else(|| missing("timestamp"))?,
            sensor_id.ok_or_else(|| missing("sensor_id"))?,
            temperature.ok_or_else(|| missing("temperature"))?,
            humidity.ok_or_else(|| missing("humidity"))?,
            pressure.ok_or_else(|| missing("pressure"))?,
        ))
    }
}

fn missing(field: &str) -> CodecError {
    decode_err(format!("missing field '{}'", field))
}

fn number(key: &str, value: &Value) -> Result<f64, CodecError> {
    match value {
        Value::F64(v) => Ok(*v),
        Value::F32(v) => Ok(f64::from(*v)),
        Value::Integer(i) => i
            .as_f64()
            .ok_or_else(|| decode_err(format!("'{}' integer out of range", key))),
        other => Err(decode_err(format!("'{}' is not a number: {}", key, other))),
    }
}

fn text(key: &str, value: Value) -> Result<String, CodecError> {
    match value {
        Value::String(s) => s
            .into_str()
            .ok_or_else(|| decode_err(format!("'{}' is not valid UTF-8", key))),
        other => Err(decode_err(format!("'{}' is not a string: {}", key, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{generate, PayloadSize};
    use crate::types::SensorId;

    #[test]
    fn test_large_reading_loses_optional_fields() {
        // Only the five core fields go on the wire
        let reading = generate(&SensorId::new("s1").unwrap(), PayloadSize::Large);
        assert_eq!(reading.sensor_readings.as_ref().map(Vec::len), Some(100));

        let decoded = MsgPackCodec
            .decode(&MsgPackCodec.encode(&reading).unwrap())
            .unwrap();
        assert!(decoded.sensor_readings.is_none());
        assert!(decoded.metadata.is_none());
        assert!(decoded.additional_data.is_none());
        assert_eq!(decoded.tier(), Some(PayloadSize::Small));
        assert_eq!(decoded, reading.core_only());
    }

    #[test]
    fn test_encoded_size_independent_of_tier() {
        let id = SensorId::new("s1").unwrap();
        let small = MsgPackCodec
            .encode(&generate(&id, PayloadSize::Small))
            .unwrap();
        let large = MsgPackCodec
            .encode(&generate(&id, PayloadSize::Large))
            .unwrap();
        assert_eq!(small.len(), large.len());
    }

    #[test]
    fn test_header_declares_five_entries() {
        let reading = SensorReading::core(1.0, "s1", 20.0, 40.0, 1000.0);
        let bytes = MsgPackCodec.encode(&reading).unwrap();
        let mut rd = bytes.as_slice();
        assert_eq!(rmp::decode::read_map_len(&mut rd).unwrap(), 5);
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let mut buf: Vec<u8> = Vec::new();
        rmp::encode::write_map_len(&mut buf, 8).unwrap();
        rmp::encode::write_str(&mut buf, "firmware").unwrap();
        rmp::encode::write_str(&mut buf, "9.9.9").unwrap();
        rmp::encode::write_str(&mut buf, "timestamp").unwrap();
        rmp::encode::write_f64(&mut buf, 1_700_000_000.25).unwrap();
        rmp::encode::write_str(&mut buf, "sensor_readings").unwrap();
        rmp::encode::write_array_len(&mut buf, 3).unwrap();
        for v in [1.0, 2.0, 3.0] {
            rmp::encode::write_f64(&mut buf, v).unwrap();
        }
        rmp::encode::write_str(&mut buf, "sensor_id").unwrap();
        rmp::encode::write_str(&mut buf, "s9").unwrap();
        rmp::encode::write_str(&mut buf, "location").unwrap();
        rmp::encode::write_map_len(&mut buf, 1).unwrap();
        rmp::encode::write_str(&mut buf, "lat").unwrap();
        rmp::encode::write_f64(&mut buf, 1.0).unwrap();
        rmp::encode::write_str(&mut buf, "temperature").unwrap();
        rmp::encode::write_f32(&mut buf, 21.5).unwrap();
        rmp::encode::write_str(&mut buf, "humidity").unwrap();
        rmp::encode::write_sint(&mut buf, 45).unwrap();
        rmp::encode::write_str(&mut buf, "pressure").unwrap();
        rmp::encode::write_f64(&mut buf, 1013.25).unwrap();

        let decoded = MsgPackCodec.decode(&buf).unwrap();
        assert_eq!(
            decoded,
            SensorReading::core(1_700_000_000.25, "s9", 21.5, 45.0, 1013.25)
        );
    }

    #[test]
    fn test_missing_core_field_fails() {
        let mut buf: Vec<u8> = Vec::new();
        rmp::encode::write_map_len(&mut buf, 1).unwrap();
        rmp::encode::write_str(&mut buf, "sensor_id").unwrap();
        rmp::encode::write_str(&mut buf, "s1").unwrap();

        let err = MsgPackCodec.decode(&buf).unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_wrong_value_type_fails() {
        let mut buf: Vec<u8> = Vec::new();
        rmp::encode::write_map_len(&mut buf, 1).unwrap();
        rmp::encode::write_str(&mut buf, "temperature").unwrap();
        rmp::encode::write_str(&mut buf, "hot").unwrap();

        assert!(MsgPackCodec.decode(&buf).is_err());
    }

    #[test]
    fn test_non_map_payload_fails() {
        let mut buf: Vec<u8> = Vec::new();
        rmp::encode::write_array_len(&mut buf, 0).unwrap();
        assert!(MsgPackCodec.decode(&buf).unwrap_err().is_decode());
        assert!(MsgPackCodec.decode(b"").is_err());
    }

    #[test]
    fn test_deeply_nested_unknown_value_fails_cleanly() {
        let mut buf: Vec<u8> = Vec::new();
        rmp::encode::write_map_len(&mut buf, 1).unwrap();
        rmp::encode::write_str(&mut buf, "extra").unwrap();
        // fixarray of one element, nested 200k deep
        buf.extend(std::iter::repeat(0x91).take(200_000));
        buf.push(0xc0);

        assert!(MsgPackCodec.decode(&buf).unwrap_err().is_decode());
    }

    #[test]
    fn test_truncated_payload_fails() {
        let reading = SensorReading::core(1.0, "s1", 20.0, 40.0, 1000.0);
        let bytes = MsgPackCodec.encode(&reading).unwrap();
        assert!(MsgPackCodec.decode(&bytes[..bytes.len() - 3]).is_err());
    }
}
