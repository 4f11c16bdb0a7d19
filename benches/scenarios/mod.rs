//! Scenario benchmarks: whole voices and the full engine render path.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
