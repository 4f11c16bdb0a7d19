//! Benchmarks for the stereo chorus (two interpolated delay taps).

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use quadfm::dsp::chorus::StereoChorus;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_chorus(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/chorus");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        let mut chorus = StereoChorus::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("half_wet", size), &size, |b, _| {
            b.iter(|| {
                for ((&x, l), r) in input.iter().zip(left.iter_mut()).zip(right.iter_mut()) {
                    (*l, *r) = chorus.process(x, black_box(0.5));
                }
            })
        });
    }

    group.finish();
}
