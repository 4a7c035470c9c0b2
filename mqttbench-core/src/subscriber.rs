// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Subscriber state.
//!
//! Owned by the task that polls the MQTT event loop, so every message is
//! handled by a single writer. A payload that fails to decode is counted and
//! logged; it never stops the subscriber.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::codec::Codec;
use crate::payload::{epoch_millis, SensorReading};
use crate::stats::{OverflowPolicy, SampleBuffer, SampleSummary};

/// A successfully decoded message.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// 1-based count of successfully decoded messages
    pub sequence: u64,
    pub topic: String,
    pub size: usize,
    pub reading: SensorReading,
    /// Receive wall-clock time minus the reading's timestamp, ms
    pub latency_ms: f64,
    pub decode_ms: f64,
}

/// Totals at the end of a subscription.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriberSummary {
    pub received: u64,
    pub decode_failures: u64,
    pub total_bytes: u64,
    pub latency: SampleSummary,
    pub decode: SampleSummary,
    /// Time between the first and last decoded message
    pub window: Duration,
}

impl SubscriberSummary {
    pub fn avg_latency_ms(&self) -> Option<f64> {
        (self.latency.count > 0).then_some(self.latency.mean)
    }

    pub fn messages_per_sec(&self) -> f64 {
        let secs = self.window.as_secs_f64();
        if self.received < 2 || secs <= 0.0 {
            return 0.0;
        }
        // n messages span n - 1 intervals
        (self.received - 1) as f64 / secs
    }
}

pub struct SubscriberState {
    codec: Arc<dyn Codec>,
    received: u64,
    decode_failures: u64,
    total_bytes: u64,
    latencies: SampleBuffer,
    decode_times: SampleBuffer,
    first_at: Option<Instant>,
    last_at: Option<Instant>,
}

impl SubscriberState {
    pub fn new(codec: Arc<dyn Codec>, capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            codec,
            received: 0,
            decode_failures: 0,
            total_bytes: 0,
            latencies: SampleBuffer::new(capacity, policy),
            decode_times: SampleBuffer::new(capacity, policy),
            first_at: None,
            last_at: None,
        }
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    /// Handle a payload stamped with the current wall-clock time.
    pub fn handle(&mut self, topic: &str, payload: &[u8]) -> Option<ReceivedMessage> {
        let receive_time_ms = epoch_millis();
        self.handle_at(topic, payload, receive_time_ms)
    }

    /// Handle a payload received at `receive_time_ms` (ms since the Unix epoch).
    ///
    /// Returns `None` if the payload could not be decoded.
    pub fn handle_at(
        &mut self,
        topic: &str,
        payload: &[u8],
        receive_time_ms: f64,
    ) -> Option<ReceivedMessage> {
        let decode_start = Instant::now();
        let reading = match self.codec.decode(payload) {
            Ok(reading) => reading,
            Err(e) => {
                self.decode_failures += 1;
                tracing::warn!(
                    topic = %topic,
                    bytes = payload.len(),
                    failures = self.decode_failures,
                    error = %e,
                    "Failed to decode message"
                );
                return None;
            }
        };
        let decode_ms = decode_start.elapsed().as_secs_f64() * 1000.0;
        let latency_ms = receive_time_ms - reading.timestamp_ms();

        let now = Instant::now();
        self.first_at.get_or_insert(now);
        self.last_at = Some(now);

        self.received += 1;
        self.total_bytes += payload.len() as u64;
        self.latencies.record(latency_ms);
        self.decode_times.record(decode_ms);

        tracing::info!(
            seq = self.received,
            topic = %topic,
            sensor_id = %reading.sensor_id,
            bytes = payload.len(),
            latency_ms,
            decode_ms,
            temperature = reading.temperature,
            "Received message"
        );

        Some(ReceivedMessage {
            sequence: self.received,
            topic: topic.to_string(),
            size: payload.len(),
            reading,
            latency_ms,
            decode_ms,
        })
    }

    pub fn summary(&self) -> SubscriberSummary {
        let window = match (self.first_at, self.last_at) {
            (Some(first), Some(last)) => last.duration_since(first),
            _ => Duration::ZERO,
        };
        SubscriberSummary {
            received: self.received,
            decode_failures: self.decode_failures,
            total_bytes: self.total_bytes,
            latency: self.latencies.summary(),
            decode: self.decode_times.summary(),
            window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{codec_for, Encoding};

    fn state(encoding: Encoding) -> SubscriberState {
        SubscriberState::new(codec_for(encoding).unwrap(), 100, OverflowPolicy::DropOldest)
    }

    #[test]
    fn test_latency_from_timestamp() {
        let mut sub = state(Encoding::Json);
        let reading = SensorReading::core(1_700_000_000.0, "s1", 20.0, 40.0, 1000.0);
        let payload = codec_for(Encoding::Json).unwrap().encode(&reading).unwrap();

        let msg = sub
            .handle_at("sensors/data", &payload, 1_700_000_000_250.0)
            .unwrap();
        assert_eq!(msg.sequence, 1);
        assert!((msg.latency_ms - 250.0).abs() < 1e-6);
        assert_eq!(msg.reading, reading);
        assert_eq!(msg.size, payload.len());
    }

    #[test]
    fn test_decode_failure_does_not_stop() {
        let mut sub = state(Encoding::Cbor);
        let good = codec_for(Encoding::Cbor)
            .unwrap()
            .encode(&SensorReading::core(1.0, "s1", 20.0, 40.0, 1000.0))
            .unwrap();

        assert!(sub.handle_at("t", b"\xff\x00garbage", 1000.0).is_none());
        assert!(sub.handle_at("t", &good, 2000.0).is_some());
        assert!(sub.handle_at("t", b"", 3000.0).is_none());

        let summary = sub.summary();
        assert_eq!(summary.received, 1);
        assert_eq!(summary.decode_failures, 2);
        assert_eq!(summary.total_bytes, good.len() as u64);
    }

    #[test]
    fn test_wrong_encoding_counts_as_failure() {
        // JSON bytes are not a msgpack map
        let mut sub = state(Encoding::MsgPack);
        let json = codec_for(Encoding::Json)
            .unwrap()
            .encode(&SensorReading::core(1.0, "s1", 20.0, 40.0, 1000.0))
            .unwrap();
        assert!(sub.handle_at("t", &json, 1000.0).is_none());
        assert_eq!(sub.decode_failures(), 1);
    }

    #[test]
    fn test_negative_latency_is_recorded() {
        let mut sub = state(Encoding::Json);
        let payload = codec_for(Encoding::Json)
            .unwrap()
            .encode(&SensorReading::core(10.0, "s1", 20.0, 40.0, 1000.0))
            .unwrap();
        let msg = sub.handle_at("t", &payload, 9_000.0).unwrap();
        assert!((msg.latency_ms + 1000.0).abs() < 1e-6);
        assert_eq!(sub.summary().latency.min, msg.latency_ms);
    }

    #[test]
    fn test_summary_empty() {
        let summary = state(Encoding::Json).summary();
        assert_eq!(summary.received, 0);
        assert_eq!(summary.avg_latency_ms(), None);
        assert_eq!(summary.messages_per_sec(), 0.0);
        assert_eq!(summary.window, Duration::ZERO);
    }

    #[test]
    fn test_sample_capacity_respected() {
        let mut sub = SubscriberState::new(
            codec_for(Encoding::Json).unwrap(),
            2,
            OverflowPolicy::StopRecording,
        );
        let codec = codec_for(Encoding::Json).unwrap();
        for i in 0..5 {
            let payload = codec
                .encode(&SensorReading::core(i as f64, "s1", 20.0, 40.0, 1000.0))
                .unwrap();
            sub.handle_at("t", &payload, 10_000.0);
        }
        let summary = sub.summary();
        assert_eq!(summary.received, 5);
        assert_eq!(summary.latency.count, 2);
        assert_eq!(summary.latency.dropped, 3);
        // first two kept: latencies 10000 - 0 and 10000 - 1000
        assert_eq!(summary.latency.max, 10_000.0);
    }
}
