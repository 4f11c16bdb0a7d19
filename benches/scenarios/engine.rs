//! Full engine: every voice sounding, filter and both effects engaged.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use quadfm::{
    dsp::filter::FilterMode,
    io::midi_note_to_freq,
    EngineConfig, FmEngine,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size * 2];

        let mut engine = FmEngine::standalone(config).expect("default config is valid");
        let params = engine.params().clone();
        params.set_filter_mode(FilterMode::LowPass);
        params.chorus_mix.set(0.4);
        params.reverb_mix.set(0.3);
        for note in [48, 55, 60, 64, 67, 72] {
            engine.note_on(note, midi_note_to_freq(note));
        }

        group.bench_with_input(BenchmarkId::new("six_voices", size), &size, |b, _| {
            b.iter(|| engine.render_interleaved(black_box(&mut out), 2))
        });

        let mut idle = FmEngine::standalone(config).expect("default config is valid");
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| idle.render_interleaved(black_box(&mut out), 2))
        });
    }

    group.finish();
}
