use std::f32::consts::TAU;

/*
Phase-Modulated Sine Oscillator
===============================

Every FM operator is one of these: a phase accumulator feeding sin().

Vocabulary
----------

  phase       Where we are in the cycle, in radians, kept in [0, 2π).

  increment   How far the phase moves per sample:
                  increment = 2π · frequency / sample_rate

  modulation  An extra phase offset (radians) added for this sample only.
              This is how one operator "modulates" another: the modulator's
              output, scaled by an index, is fed in here.


The Math
--------

    out[n]   = sin(phase[n] + modulation[n])
    phase[n+1] = (phase[n] + increment) wrapped into [0, 2π)

Strictly speaking this is phase modulation (like the DX7), but the audible
result is the same family of sidebands as true frequency modulation.


Why reset() Exists
------------------

When a voice is retriggered we zero the phase so every note starts its
waveform at the same point. Without it, the attack begins wherever the
oscillator last stopped, and FM timbres (which are very phase sensitive)
sound different on every keypress.
*/

pub struct Oscillator {
    phase: f32,     // radians, [0, TAU)
    increment: f32, // radians per sample
    frequency: f32,
    sample_rate: f32,
}

impl Oscillator {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let mut osc = Self {
            phase: 0.0,
            increment: 0.0,
            frequency: 0.0,
            sample_rate,
        };
        osc.set_frequency(frequency);
        osc
    }

    /// Set the frequency in Hz.
    ///
    /// Negative or non-finite frequencies are clamped to 0 Hz, which holds
    /// the phase still (the oscillator outputs a constant).
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = if frequency.is_finite() {
            frequency.max(0.0)
        } else {
            0.0
        };
        self.increment = TAU * self.frequency / self.sample_rate;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Produce one sample with the given phase modulation (radians), then advance.
    #[inline]
    pub fn process(&mut self, modulation: f32) -> f32 {
        let out = (self.phase + modulation).sin();

        self.phase += self.increment;
        if self.phase >= TAU {
            // rem_euclid also covers increments larger than one cycle
            self.phase = self.phase.rem_euclid(TAU);
        }

        out
    }

    /// Zero the phase. Frequency is left untouched.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
