pub mod dsp;
pub mod engine; // Owned engine aggregate, render pull, control handle
pub mod error;
pub mod io;
pub mod modulation; // LFO / mod envelope routing at control rate
pub mod monitor; // Scope and voice status for visualization
pub mod params; // Lock-free parameter surface
pub mod patch;
pub mod synth; // FM voices, algorithms and polyphony

pub use engine::{EngineConfig, FmEngine, SynthHandle};
pub use error::SynthError;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
/// Floor for every envelope time constant, in seconds.
pub(crate) const MIN_TIME: f32 = 0.001;
