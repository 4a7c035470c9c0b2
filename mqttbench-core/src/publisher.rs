// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Publisher driver.
//!
//! Generates, encodes and publishes a fixed number of readings at a fixed
//! interval. Encode time and publish hand-off time are measured per message.
//! Any encode or publish error ends the run.

use std::future::Future;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::codec::Codec;
use crate::error::{BenchResult, ConnectionError};
use crate::payload::{PayloadSize, ReadingGenerator};
use crate::stats::{OverflowPolicy, SampleBuffer, SampleSummary};
use crate::types::{QosLevel, SensorId};

/// Upper bound on retained per-message timings for a single run.
const MAX_TIMING_SAMPLES: usize = 1_000_000;

/// Anything that can hand an encoded payload to a broker.
pub trait Transport {
    fn publish(
        &self,
        topic: &str,
        qos: QosLevel,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), ConnectionError>> + Send;
}

/// Parameters of one publish run.
#[derive(Debug, Clone)]
pub struct PublisherSettings {
    pub topic: String,
    pub sensor_id: SensorId,
    pub count: u32,
    pub interval: Duration,
    pub payload: PayloadSize,
    pub qos: QosLevel,
}

/// Totals for a completed publish run.
#[derive(Debug, Clone, Serialize)]
pub struct PublishSummary {
    pub messages: u64,
    pub total_bytes: u64,
    /// Encode time per message, ms
    pub encode: SampleSummary,
    /// Time for the client to accept a publish request, ms
    pub publish: SampleSummary,
    pub elapsed: Duration,
}

impl PublishSummary {
    pub fn avg_encode_ms(&self) -> f64 {
        self.encode.mean
    }

    pub fn avg_message_bytes(&self) -> f64 {
        if self.messages == 0 {
            return 0.0;
        }
        self.total_bytes as f64 / self.messages as f64
    }

    pub fn messages_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.messages as f64 / secs
    }
}

/// One publish run against a transport.
pub struct PublishRun<'a, T: Transport> {
    transport: &'a T,
    codec: &'a dyn Codec,
    generator: ReadingGenerator<StdRng>,
}

impl<'a, T: Transport> PublishRun<'a, T> {
    pub fn new(transport: &'a T, codec: &'a dyn Codec) -> Self {
        Self::with_generator(
            transport,
            codec,
            ReadingGenerator::new(StdRng::from_entropy()),
        )
    }

    /// Use a caller-supplied generator (seeded in tests).
    pub fn with_generator(
        transport: &'a T,
        codec: &'a dyn Codec,
        generator: ReadingGenerator<StdRng>,
    ) -> Self {
        Self {
            transport,
            codec,
            generator,
        }
    }

    /// Publish `settings.count` readings, sleeping `settings.interval` between them.
    pub async fn execute(&mut self, settings: &PublisherSettings) -> BenchResult<PublishSummary> {
        let samples = (settings.count as usize).clamp(1, MAX_TIMING_SAMPLES);
        let mut encode_times = SampleBuffer::new(samples, OverflowPolicy::DropOldest);
        let mut publish_times = SampleBuffer::new(samples, OverflowPolicy::DropOldest);
        let mut total_bytes = 0u64;
        let mut messages = 0u64;

        tracing::info!(
            topic = %settings.topic,
            encoding = %self.codec.encoding(),
            payload = %settings.payload,
            count = settings.count,
            interval_ms = settings.interval.as_millis() as u64,
            qos = settings.qos.as_u8(),
            "Starting publisher"
        );

        let started = Instant::now();
        for seq in 1..=settings.count {
            let reading = self
                .generator
                .generate(&settings.sensor_id, settings.payload);

            let encode_start = Instant::now();
            let bytes = self.codec.encode(&reading)?;
            let encode_ms = encode_start.elapsed().as_secs_f64() * 1000.0;

            let size = bytes.len();
            let publish_start = Instant::now();
            self.transport
                .publish(&settings.topic, settings.qos, bytes)
                .await?;
            let publish_ms = publish_start.elapsed().as_secs_f64() * 1000.0;

            encode_times.record(encode_ms);
            publish_times.record(publish_ms);
            total_bytes += size as u64;
            messages += 1;

            tracing::info!(
                seq,
                total = settings.count,
                bytes = size,
                encode_ms,
                publish_ms,
                "Published message"
            );

            if seq < settings.count && !settings.interval.is_zero() {
                tokio::time::sleep(settings.interval).await;
            }
        }

        Ok(PublishSummary {
            messages,
            total_bytes,
            encode: encode_times.summary(),
            publish: publish_times.summary(),
            elapsed: started.elapsed(),
        })
    }
}
