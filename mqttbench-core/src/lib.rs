// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! mqttbench Core Library
//!
//! Sensor payload model, wire codecs and the publish/subscribe drivers used by
//! the `mqttbench` CLI. MQTT session handling is delegated to `rumqttc`.

pub mod codec;
pub mod config;
pub mod error;
pub mod mqtt;
pub mod payload;
pub mod publisher;
pub mod stats;
pub mod subscriber;
pub mod types;

// Re-export commonly used types
pub use codec::{Codec, CodecRegistry, Encoding};
pub use config::{BenchConfig, BrokerConfig, ConfigLoader, PublisherConfig, SubscriberConfig};
pub use error::{BenchError, BenchResult, CodecError, ConnectionError, HardValidationError};
pub use mqtt::{IncomingMessage, MqttPublisher, MqttSession, MqttSettings};
pub use payload::{generate, PayloadSize, ReadingGenerator, SensorReading};
pub use publisher::{PublishRun, PublishSummary, PublisherSettings, Transport};
pub use stats::{OverflowPolicy, SampleBuffer, SampleSummary};
pub use subscriber::{ReceivedMessage, SubscriberState, SubscriberSummary};
pub use types::{Port, QosLevel, SensorId};
