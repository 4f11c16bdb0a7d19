//! Benchmarks for low-level DSP primitives.

mod chorus;
mod envelope;
mod filter;
mod oscillator;
mod reverb;

pub use chorus::bench_chorus;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
pub use reverb::bench_reverb;
