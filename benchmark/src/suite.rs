// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Offline codec suite.
//!
//! Times encode, decode and encode+decode for every encoding and payload size
//! without a broker, and records the encoded size of each combination.

use std::hint::black_box;

use mqttbench_core::{
    generate, BenchResult, CodecError, CodecRegistry, Encoding, PayloadSize, SensorId,
};

use crate::harness::BenchmarkHarness;
use crate::metrics::{BenchmarkCategory, BenchmarkReport, BenchmarkResult};

/// What to run.
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    pub iterations: u64,
    pub warmup: u64,
    /// Empty means every category
    pub categories: Vec<BenchmarkCategory>,
    pub encodings: Vec<Encoding>,
    pub sizes: Vec<PayloadSize>,
    pub keep_raw_samples: bool,
}

impl SuiteOptions {
    pub fn quick() -> Self {
        Self {
            iterations: 10,
            warmup: 2,
            ..Self::default()
        }
    }

    fn wants(&self, category: BenchmarkCategory) -> bool {
        self.categories.is_empty() || self.categories.contains(&category)
    }
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            iterations: 1000,
            warmup: 100,
            categories: Vec::new(),
            encodings: Encoding::ALL.to_vec(),
            sizes: PayloadSize::ALL.to_vec(),
            keep_raw_samples: false,
        }
    }
}

/// Run the suite into `report`. Returns the number of results added.
pub fn run_codec_suite(
    report: &mut BenchmarkReport,
    options: &SuiteOptions,
) -> BenchResult<usize> {
    let harness = BenchmarkHarness::new()
        .warmup(options.warmup)
        .iterations(options.iterations)
        .keep_samples(options.keep_raw_samples);
    let registry = CodecRegistry::standard();
    let sensor_id = SensorId::new("bench_sensor")?;
    let before = report.results.len();

    // One reading per size, shared by every encoding
    for &size in &options.sizes {
        let reading = generate(&sensor_id, size);
        for &encoding in &options.encodings {
            let codec = registry.get(encoding)?;
            let bytes = codec.encode(&reading)?;
            let encoded_len = bytes.len() as u64;
            let lossy = encoding == Encoding::MsgPack;

            if options.wants(BenchmarkCategory::EncodedSize) {
                report.add_result(
                    BenchmarkResult::encoded_size(encoding.as_str(), size.as_str(), encoded_len)
                        .with_metadata("core_fields_only", lossy),
                );
            }

            if options.wants(BenchmarkCategory::Encode) {
                let samples = harness.run(|| {
                    black_box(codec.encode(black_box(&reading))?);
                    Ok::<(), CodecError>(())
                })?;
                report.add_result(BenchmarkResult::latency(
                    BenchmarkCategory::Encode,
                    encoding.as_str(),
                    size.as_str(),
                    samples,
                    encoded_len,
                    harness.should_keep_samples(),
                ));
            }

            if options.wants(BenchmarkCategory::Decode) {
                let samples = harness.run(|| {
                    black_box(codec.decode(black_box(&bytes))?);
                    Ok::<(), CodecError>(())
                })?;
                report.add_result(BenchmarkResult::latency(
                    BenchmarkCategory::Decode,
                    encoding.as_str(),
                    size.as_str(),
                    samples,
                    encoded_len,
                    harness.should_keep_samples(),
                ));
            }

            if options.wants(BenchmarkCategory::Roundtrip) {
                let samples = harness.run(|| {
                    let encoded = codec.encode(black_box(&reading))?;
                    black_box(codec.decode(&encoded)?);
                    Ok::<(), CodecError>(())
                })?;
                report.add_result(
                    BenchmarkResult::latency(
                        BenchmarkCategory::Roundtrip,
                        encoding.as_str(),
                        size.as_str(),
                        samples,
                        encoded_len,
                        harness.should_keep_samples(),
                    )
                    .with_metadata("core_fields_only", lossy),
                );
            }
        }
    }

    Ok(report.results.len() - before)
}
