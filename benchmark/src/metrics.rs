// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Metrics types for codec benchmark results.
//!
//! Every result is tagged with the encoding and payload size it measured so
//! reports from different runs can be lined up against each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use sysinfo::System;

/// Categories of benchmarks supported by the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkCategory {
    /// Reading to bytes
    Encode,
    /// Bytes to reading
    Decode,
    /// Encode followed by decode
    Roundtrip,
    /// Bytes on the wire per encoding and payload size
    EncodedSize,
}

impl BenchmarkCategory {
    pub const ALL: [BenchmarkCategory; 4] = [
        BenchmarkCategory::Encode,
        BenchmarkCategory::Decode,
        BenchmarkCategory::Roundtrip,
        BenchmarkCategory::EncodedSize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkCategory::Encode => "encode",
            BenchmarkCategory::Decode => "decode",
            BenchmarkCategory::Roundtrip => "roundtrip",
            BenchmarkCategory::EncodedSize => "encoded_size",
        }
    }
}

impl std::fmt::Display for BenchmarkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BenchmarkCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown category '{}' (expected encode, decode, roundtrip or encoded_size)",
                    s
                )
            })
    }
}

/// Latency distribution in nanoseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyMetrics {
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: f64,
    /// Median (p50)
    pub median_ns: u64,
    pub p95_ns: u64,
    pub p99_ns: u64,
    pub std_dev_ns: f64,
    /// Sorted samples, thinned to about a thousand points past `RAW_SAMPLE_LIMIT`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<u64>>,
}

/// Raw sample vectors longer than this are thinned before they go in a report.
const RAW_SAMPLE_LIMIT: usize = 10_000;

/// Sample at fraction `p` of a sorted, non-empty slice.
fn rank(sorted: &[u64], p: f64) -> u64 {
    let idx = (sorted.len() as f64 * p) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

impl LatencyMetrics {
    /// Summarize per-operation timings in nanoseconds.
    pub fn from_samples(mut samples: Vec<u64>, keep_raw: bool) -> Self {
        let (Some(&min_ns), Some(&max_ns)) = (samples.iter().min(), samples.iter().max()) else {
            return Self::default();
        };
        samples.sort_unstable();

        let n = samples.len() as f64;
        let mean_ns = samples.iter().map(|&x| x as f64).sum::<f64>() / n;
        let std_dev_ns = (samples
            .iter()
            .map(|&x| (x as f64 - mean_ns).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();

        let summary = Self {
            min_ns,
            max_ns,
            mean_ns,
            median_ns: rank(&samples, 0.5),
            p95_ns: rank(&samples, 0.95),
            p99_ns: rank(&samples, 0.99),
            std_dev_ns,
            samples: None,
        };
        if !keep_raw {
            return summary;
        }

        let raw = if samples.len() > RAW_SAMPLE_LIMIT {
            let step = samples.len() / 1000;
            samples.into_iter().step_by(step).collect()
        } else {
            samples
        };
        Self {
            samples: Some(raw),
            ..summary
        }
    }

    /// `ns`, `μs`, `ms` or `s`, whichever keeps the value readable.
    pub fn format_latency(ns: u64) -> String {
        if ns < 1_000 {
            return format!("{}ns", ns);
        }
        scaled(ns as f64, &[(1e9, "s"), (1e6, "ms"), (1e3, "μs")])
    }
}

fn scaled(value: f64, units: &[(f64, &str)]) -> String {
    for &(factor, unit) in units {
        if value >= factor {
            return format!("{:.2}{}", value / factor, unit);
        }
    }
    format!("{:.2}", value)
}

/// Operation and byte rates over the measured time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThroughputMetrics {
    /// Encode or decode calls per second
    pub messages_per_sec: f64,
    pub bytes_per_sec: f64,
    pub total_messages: u64,
    pub total_bytes: u64,
    pub duration_ns: u64,
}

impl ThroughputMetrics {
    /// Rates for `ops` operations moving `bytes` in `duration_ns`. A zero duration yields zero rates.
    pub fn calculate(ops: u64, bytes: u64, duration_ns: u64) -> Self {
        let secs = Duration::from_nanos(duration_ns).as_secs_f64();
        let per_sec = |n: u64| if secs > 0.0 { n as f64 / secs } else { 0.0 };
        Self {
            messages_per_sec: per_sec(ops),
            bytes_per_sec: per_sec(bytes),
            total_messages: ops,
            total_bytes: bytes,
            duration_ns,
        }
    }

    pub fn format_bytes_per_sec(bps: f64) -> String {
        if bps < 1_000.0 {
            return format!("{:.2} B/s", bps);
        }
        scaled(bps, &[(1e9, " GB/s"), (1e6, " MB/s"), (1e3, " KB/s")])
    }
}

/// Host the codec numbers were taken on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub cpu_model: String,
    pub cpu_cores: usize,
}

impl SystemInfo {
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();

        let cpu_model = match sys.cpus().first() {
            Some(cpu) => cpu.brand().trim().to_string(),
            None => "unknown".to_string(),
        };
        let os = match (System::name(), System::os_version()) {
            (Some(name), Some(version)) => format!("{} {}", name, version),
            (Some(name), None) => name,
            _ => std::env::consts::OS.to_string(),
        };

        Self {
            os,
            cpu_model,
            cpu_cores: sys.cpus().len(),
        }
    }
}

/// A single benchmark result with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// e.g. `encode_cbor_large`
    pub name: String,
    pub category: BenchmarkCategory,
    pub encoding: String,
    pub payload_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<ThroughputMetrics>,
    /// Encoded message size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_bytes: Option<u64>,
    pub iterations: u64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl BenchmarkResult {
    fn base(
        category: BenchmarkCategory,
        encoding: impl Into<String>,
        payload_size: impl Into<String>,
    ) -> Self {
        let encoding = encoding.into();
        let payload_size = payload_size.into();
        Self {
            name: format!("{}_{}_{}", category, encoding, payload_size),
            category,
            encoding,
            payload_size,
            latency: None,
            throughput: None,
            encoded_bytes: None,
            iterations: 0,
            metadata: HashMap::new(),
        }
    }

    /// Latency result from per-iteration samples (ns).
    ///
    /// Throughput is derived from the summed sample time, with `bytes_per_op`
    /// counted once per iteration.
    pub fn latency(
        category: BenchmarkCategory,
        encoding: impl Into<String>,
        payload_size: impl Into<String>,
        samples: Vec<u64>,
        bytes_per_op: u64,
        keep_raw_samples: bool,
    ) -> Self {
        let iterations = samples.len() as u64;
        let busy_ns: u64 = samples.iter().sum();
        Self {
            latency: Some(LatencyMetrics::from_samples(samples, keep_raw_samples)),
            throughput: Some(ThroughputMetrics::calculate(
                iterations,
                bytes_per_op * iterations,
                busy_ns,
            )),
            encoded_bytes: Some(bytes_per_op),
            iterations,
            ..Self::base(category, encoding, payload_size)
        }
    }

    /// Encoded size result for one encoding and payload size.
    pub fn encoded_size(
        encoding: impl Into<String>,
        payload_size: impl Into<String>,
        bytes: u64,
    ) -> Self {
        Self {
            encoded_bytes: Some(bytes),
            iterations: 1,
            ..Self::base(BenchmarkCategory::EncodedSize, encoding, payload_size)
        }
    }

    /// Add metadata to the result. Values that fail to serialize are skipped.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), value);
        }
        self
    }
}

/// Complete benchmark suite report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub benchmark_suite: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self {
            benchmark_suite: "mqttbench-codec".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }

    /// Results of one category, in insertion order.
    pub fn by_category(&self, category: BenchmarkCategory) -> impl Iterator<Item = &BenchmarkResult> {
        self.results.iter().filter(move |r| r.category == category)
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}
