//! Benchmarks for the phase-modulated sine operator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use quadfm::dsp::oscillator::Oscillator;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut osc = Oscillator::new(440.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("carrier", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = osc.process(black_box(0.0));
                }
            })
        });

        // Two operators in series: one modulator feeding one carrier
        let mut modulator = Oscillator::new(880.0, SAMPLE_RATE);
        let mut carrier = Oscillator::new(440.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("pair", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    let m = modulator.process(0.0) * black_box(2.0);
                    *out = carrier.process(m);
                }
            })
        });
    }

    group.finish();
}
