// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI tool to run the codec benchmarks and write a JSON report.

use clap::Parser;
use mqttbench_benchmark::harness::measure;
use mqttbench_benchmark::{
    run_codec_suite, BenchmarkCategory, BenchmarkReport, JsonReporter, LatencyMetrics,
    SuiteOptions, ThroughputMetrics,
};
use mqttbench_core::{Encoding, PayloadSize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "run_benchmarks")]
#[command(about = "Benchmark mqttbench payload codecs and generate JSON reports")]
struct Args {
    /// Output directory for benchmark data
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Measured iterations per encoding and payload size
    #[arg(short, long, default_value_t = 1000)]
    iterations: u64,

    /// Categories to run: encode, decode, roundtrip, encoded_size (all if not specified)
    #[arg(short, long)]
    category: Option<Vec<String>>,

    /// Encodings to run (all if not specified)
    #[arg(short, long)]
    encoding: Option<Vec<String>>,

    /// Payload sizes to run (all if not specified)
    #[arg(short, long)]
    payload: Option<Vec<String>>,

    /// Keep raw latency samples in the report
    #[arg(long)]
    raw_samples: bool,

    /// Also write one file per category
    #[arg(long)]
    split: bool,

    /// Run in quick mode (fewer iterations)
    #[arg(long)]
    quick: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut options = if args.quick {
        SuiteOptions::quick()
    } else {
        SuiteOptions {
            iterations: args.iterations,
            warmup: (args.iterations / 10).max(1),
            ..SuiteOptions::default()
        }
    };
    options.keep_raw_samples = args.raw_samples;

    if let Some(categories) = &args.category {
        options.categories = categories
            .iter()
            .map(|c| c.parse::<BenchmarkCategory>())
            .collect::<Result<_, _>>()
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(encodings) = &args.encoding {
        options.encodings = encodings
            .iter()
            .map(|e| e.parse::<Encoding>())
            .collect::<Result<_, _>>()?;
    }
    if let Some(sizes) = &args.payload {
        options.sizes = sizes
            .iter()
            .map(|s| s.parse::<PayloadSize>())
            .collect::<Result<_, _>>()?;
    }

    println!("mqttbench Codec Benchmark Suite");
    println!("===============================");
    println!("Output directory: {:?}", args.output);
    println!("Iterations: {}", options.iterations);
    println!();

    let reporter = JsonReporter::new(&args.output)?;
    let mut report = BenchmarkReport::new();

    println!("Running codec benchmarks...");
    let (added, elapsed) = measure(|| run_codec_suite(&mut report, &options));
    println!("  ✓ {} results in {:.2}s", added?, elapsed.as_secs_f64());

    let path = reporter.save(&report)?;
    println!();
    println!("Benchmark report saved to: {:?}", path);
    if args.split {
        for path in reporter.save_by_category(&report)? {
            println!("  + {:?}", path);
        }
    }
    println!();

    print_summary(&report);

    Ok(())
}

fn print_summary(report: &BenchmarkReport) {
    println!("Summary");
    println!("-------");
    println!();

    for result in &report.results {
        match (&result.latency, &result.throughput) {
            (Some(latency), Some(throughput)) => println!(
                "{}: median={}, p99={}, {}",
                result.name,
                LatencyMetrics::format_latency(latency.median_ns),
                LatencyMetrics::format_latency(latency.p99_ns),
                ThroughputMetrics::format_bytes_per_sec(throughput.bytes_per_sec)
            ),
            _ => {
                if let Some(bytes) = result.encoded_bytes {
                    println!("{}: {} bytes", result.name, bytes);
                }
            }
        }
    }
}
