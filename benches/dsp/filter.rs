//! Benchmarks for the biquad and its coefficient updates.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use quadfm::dsp::filter::{Biquad, FilterMode};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut filter = Biquad::lowpass(SAMPLE_RATE, 1000.0, 2.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        let mut filter = Biquad::highpass(SAMPLE_RATE, 1000.0, 2.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("highpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    // Once per control tick in the engine
    let mut filter = Biquad::new(SAMPLE_RATE);
    group.bench_function("configure", |b| {
        b.iter(|| filter.configure(FilterMode::LowPass, black_box(2500.0), black_box(1.5)))
    });

    group.finish();
}
