//! Low Frequency Oscillator (LFO).

use std::f32::consts::TAU;

/*
Low Frequency Oscillators
=========================

An LFO is simply an oscillator running at sub-audio frequencies. The same
waveform math applies, but the context and usage are completely different.

Vocabulary
----------

  control-rate    Frequencies below human hearing: ~0.01 Hz to ~20 Hz.
                  These oscillators modulate parameters over time.

  bipolar         Output swings positive AND negative: -depth to +depth.
                  The parameter moves above AND below its base value.

  free-running    The LFO never resets on note_on. Its phase is unrelated to
                  the notes being played, so consecutive notes catch the
                  modulation at different points. That is the behavior here.


Phase in Cycles
---------------

Unlike the audio oscillator (radians), the LFO keeps its phase in cycles:

    out    = sin(2π · phase) · depth
    phase += rate / sample_rate        (wrapped into [0, 1))

Rate and depth are passed on every call, so a control thread can sweep them
freely without the LFO holding stale copies.


Sample Rate
-----------

The LFO advances once per call. The modulation router calls it once per
control block, so it is constructed with the *control* rate
(sample_rate / block_size), not the audio sample rate.
*/

pub struct Lfo {
    phase: f32, // cycles, [0, 1)
    sample_rate: f32,
}

impl Lfo {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
        }
    }

    /// Return `sin(2π·phase) · depth`, then advance by `rate` Hz.
    #[inline]
    pub fn process(&mut self, rate: f32, depth: f32) -> f32 {
        let output = (self.phase * TAU).sin() * depth;

        self.phase += rate.max(0.0) / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase = self.phase.fract();
        }

        output
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
