//! Output Saturation
//!
//! The final stage of the mix bus. Summed voices plus reverb tails can stack
//! past full scale, so the stereo pair is pushed through a smooth transfer
//! function instead of being hard-clipped by the audio device.
//!
//! # Transfer Function
//!
//! ```text
//!   f(x) = tanh(x)
//!
//!    1 ┤            ________
//!      │        .-''
//!    0 ┤------/----------------
//!      │ __.-'
//!   -1 ┤'
//! ```
//!
//! - Near zero tanh is almost linear (f(x) ≈ x), so quiet passages pass clean.
//! - Large inputs approach ±1 asymptotically and never exceed it.
//! - Odd-symmetric, so it adds only odd harmonics and no DC offset.

/// Soft clip one sample into (-1, 1).
#[inline]
pub fn soft_clip(sample: f32) -> f32 {
    sample.tanh()
}

/// Soft clip a stereo pair.
#[inline]
pub fn soft_clip_stereo((left, right): (f32, f32)) -> (f32, f32) {
    (soft_clip(left), soft_clip(right))
}
