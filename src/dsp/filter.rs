use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Biquad Filter
=============

A biquad is a second-order IIR section: two poles and two zeros, enough for
a 12 dB/octave lowpass or highpass with an adjustable resonant peak.

| mode      | passes       | rejects      |
| --------- | ------------ | ------------ |
| low-pass  | below cutoff | above cutoff |
| high-pass | above cutoff | below cutoff |

Coefficients (Audio EQ Cookbook)
--------------------------------

    w0    = 2π · cutoff / sample_rate
    alpha = sin(w0) / (2 · Q)

    lowpass:   b0 = (1 - cos w0)/2   b1 = 1 - cos w0      b2 = (1 - cos w0)/2
    highpass:  b0 = (1 + cos w0)/2   b1 = -(1 + cos w0)   b2 = (1 + cos w0)/2
    both:      a0 = 1 + alpha        a1 = -2 cos w0       a2 = 1 - alpha

Everything is divided by a0, giving five normalized coefficients. Naming
here follows the feedforward / feedback split:

    a0, a1, a2   feedforward (applied to x[n], x[n-1], x[n-2])
    b1, b2       feedback    (applied to y[n-1], y[n-2])

Direct Form I
-------------

    y[n] = a0·x[n] + a1·x[n-1] + a2·x[n-2] - b1·y[n-1] - b2·y[n-2]

Stale Coefficients
------------------

The filter never re-derives its coefficients on its own. After changing mode,
cutoff or Q, call `set_lowpass` / `set_highpass` / `configure` before the next
`process`; the engine does this on every control tick.
*/

/// Filter response selected on the parameter surface.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Off,
    LowPass,
    HighPass,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::Off, FilterMode::LowPass, FilterMode::HighPass];

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterMode::Off => "OFF",
            FilterMode::LowPass => "LP",
            FilterMode::HighPass => "HP",
        }
    }
}

/// Normalized coefficient set (see module notes for naming).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
    pub b1: f32,
    pub b2: f32,
}

impl BiquadCoefficients {
    /// Pass-through: y[n] = x[n].
    pub const IDENTITY: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
    };
}

pub struct Biquad {
    coeffs: BiquadCoefficients,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
    sample_rate: f32,
}

impl Biquad {
    /// Lowest cutoff accepted by the coefficient math.
    const MIN_CUTOFF: f32 = 10.0;
    /// Q floor; below this the section is barely damped at all.
    const MIN_Q: f32 = 0.1;

    pub fn new(sample_rate: f32) -> Self {
        Self {
            coeffs: BiquadCoefficients::IDENTITY,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            sample_rate,
        }
    }

    pub fn lowpass(sample_rate: f32, cutoff_hz: f32, q: f32) -> Self {
        let mut filter = Self::new(sample_rate);
        filter.set_lowpass(cutoff_hz, q);
        filter
    }

    pub fn highpass(sample_rate: f32, cutoff_hz: f32, q: f32) -> Self {
        let mut filter = Self::new(sample_rate);
        filter.set_highpass(cutoff_hz, q);
        filter
    }

    pub fn set_lowpass(&mut self, cutoff_hz: f32, q: f32) {
        let (cos_w0, alpha) = self.prewarp(cutoff_hz, q);
        let b0 = (1.0 - cos_w0) / 2.0;
        let b1 = 1.0 - cos_w0;
        let b2 = (1.0 - cos_w0) / 2.0;
        self.normalize(b0, b1, b2, cos_w0, alpha);
    }

    pub fn set_highpass(&mut self, cutoff_hz: f32, q: f32) {
        let (cos_w0, alpha) = self.prewarp(cutoff_hz, q);
        let b0 = (1.0 + cos_w0) / 2.0;
        let b1 = -(1.0 + cos_w0);
        let b2 = (1.0 + cos_w0) / 2.0;
        self.normalize(b0, b1, b2, cos_w0, alpha);
    }

    /// Recompute coefficients for `mode`. `Off` installs the identity set.
    pub fn configure(&mut self, mode: FilterMode, cutoff_hz: f32, q: f32) {
        match mode {
            FilterMode::Off => self.coeffs = BiquadCoefficients::IDENTITY,
            FilterMode::LowPass => self.set_lowpass(cutoff_hz, q),
            FilterMode::HighPass => self.set_highpass(cutoff_hz, q),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.a0 * input + c.a1 * self.x1 + c.a2 * self.x2 - c.b1 * self.y1 - c.b2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    /// Clear the history; coefficients are kept.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    fn prewarp(&self, cutoff_hz: f32, q: f32) -> (f32, f32) {
        let nyquist_guard = self.sample_rate * 0.49;
        // Below ~20 Hz sample rates the guard sits under MIN_CUTOFF; the guard wins
        let cutoff = cutoff_hz.max(Self::MIN_CUTOFF).min(nyquist_guard);
        let q = q.max(Self::MIN_Q);

        let w0 = TAU * cutoff / self.sample_rate;
        (w0.cos(), w0.sin() / (2.0 * q))
    }

    fn normalize(&mut self, b0: f32, b1: f32, b2: f32, cos_w0: f32, alpha: f32) {
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        self.coeffs = BiquadCoefficients {
            a0: b0 / a0,
            a1: b1 / a0,
            a2: b2 / a0,
            b1: a1 / a0,
            b2: a2 / a0,
        };
    }
}
