// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Reading generation benchmarks.
//!
//! The publisher generates a fresh reading per message, so generation cost is
//! part of every publish iteration.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mqttbench_core::{PayloadSize, ReadingGenerator, SensorId};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_generate");
    let sensor_id = SensorId::new("bench_sensor").expect("valid sensor id");
    let mut generator = ReadingGenerator::new(StdRng::seed_from_u64(42));

    for size in PayloadSize::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| black_box(generator.generate(&sensor_id, size)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
