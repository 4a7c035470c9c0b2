// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! mqttbench Codec Benchmarking Framework
//!
//! Measures the wire codecs offline, without a broker in the loop.
//!
//! # Benchmark Categories
//!
//! - **Encode**: reading to bytes, per encoding and payload size
//! - **Decode**: bytes back to a reading
//! - **Roundtrip**: encode followed by decode
//! - **Encoded Size**: bytes on the wire
//!
//! # Data Output
//!
//! Results are written as JSON reports for later comparison.

pub mod harness;
pub mod metrics;
pub mod reporter;
pub mod suite;

pub use harness::BenchmarkHarness;
pub use metrics::{
    BenchmarkCategory, BenchmarkReport, BenchmarkResult, LatencyMetrics, SystemInfo,
    ThroughputMetrics,
};
pub use reporter::JsonReporter;
pub use suite::{run_codec_suite, SuiteOptions};
