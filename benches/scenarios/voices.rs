//! Benchmarks for a single FM voice under each algorithm.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use quadfm::synth::{Algorithm, FmVoice};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for algorithm in Algorithm::ALL {
            let mut voice = FmVoice::new(SAMPLE_RATE);
            voice.set_algorithm(algorithm);
            voice.note_on(110.0);

            let id = BenchmarkId::new(algorithm.name(), size);
            group.bench_with_input(id, &size, |b, _| {
                b.iter(|| {
                    buffer.fill(0.0);
                    voice.render_add(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
