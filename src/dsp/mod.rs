//! Low-level DSP primitives used by the FM voices and the mix pipeline.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! making them safe to embed directly inside voice structs or the engine.
//! They stay focused on the signal-processing math; parameter routing and
//! voice management live in `synth` and `modulation`.

/// Stereo modulated-delay chorus.
pub mod chorus;
/// Fractional delay line used by the chorus.
pub mod delay;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Second-order IIR (biquad) lowpass/highpass filter.
pub mod filter;
/// Free-running low frequency oscillator.
pub mod lfo;
/// Phase-modulated sine oscillator (FM operator core).
pub mod oscillator;
/// Schroeder reverb: parallel combs into serial allpasses.
pub mod reverb;
/// Output soft clipping.
pub mod saturation;

pub use envelope::EnvelopeState;
