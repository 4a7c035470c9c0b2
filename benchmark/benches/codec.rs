// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Codec microbenchmarks.
//!
//! Encode and decode cost for every encoding at each payload size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mqttbench_core::{generate, CodecRegistry, Encoding, PayloadSize, SensorId};
use std::time::Duration;

fn sensor() -> SensorId {
    SensorId::new("bench_sensor").expect("valid sensor id")
}

/// Benchmark encode for each encoding and payload size.
fn bench_encode(c: &mut Criterion) {
    let registry = CodecRegistry::standard();
    let mut group = c.benchmark_group("codec_encode");
    group.measurement_time(Duration::from_secs(3));

    for size in PayloadSize::ALL {
        let reading = generate(&sensor(), size);
        for encoding in Encoding::ALL {
            let codec = registry.get(encoding).expect("registered codec");
            let encoded_len = codec.encode(&reading).expect("encode").len();
            group.throughput(Throughput::Bytes(encoded_len as u64));

            group.bench_with_input(
                BenchmarkId::new(encoding.as_str(), size),
                &reading,
                |b, reading| {
                    b.iter(|| black_box(codec.encode(black_box(reading)).expect("encode")));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark decode for each encoding and payload size.
fn bench_decode(c: &mut Criterion) {
    let registry = CodecRegistry::standard();
    let mut group = c.benchmark_group("codec_decode");
    group.measurement_time(Duration::from_secs(3));

    for size in PayloadSize::ALL {
        let reading = generate(&sensor(), size);
        for encoding in Encoding::ALL {
            let codec = registry.get(encoding).expect("registered codec");
            let bytes = codec.encode(&reading).expect("encode");
            group.throughput(Throughput::Bytes(bytes.len() as u64));

            group.bench_with_input(
                BenchmarkId::new(encoding.as_str(), size),
                &bytes,
                |b, bytes| {
                    b.iter(|| black_box(codec.decode(black_box(bytes)).expect("decode")));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_inputs_decode() {
        let registry = CodecRegistry::standard();
        for size in PayloadSize::ALL {
            let reading = generate(&sensor(), size);
            for encoding in Encoding::ALL {
                let codec = registry.get(encoding).expect("registered codec");
                let bytes = codec.encode(&reading).unwrap();
                assert!(codec.decode(&bytes).is_ok());
            }
        }
    }
}
