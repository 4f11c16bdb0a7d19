//! Reverb - Room Simulation via Delay Networks
//!
//! Reverb simulates the sound of a space by creating many delayed, filtered
//! reflections of the input signal. This implementation uses the classic
//! Schroeder reverb algorithm.
//!
//! # Schroeder Reverb Architecture
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→ [Comb 3] ──┼──→ (+) ÷4 ──→ [Allpass 1] ──→ [Allpass 2] ──→ wet
//!         └──→ [Comb 4] ──┘
//!
//! Output = input · (1 - mix) + wet · mix
//! ```
//!
//! ## Comb Filters
//!
//! Each comb is a delay line whose output is fed back through a one-pole
//! lowpass (the damping filter) and a decay gain:
//!
//! ```text
//! damped   = delayed · (1 - damping) + damped · damping
//! buf[n]   = x[n] + damped · decay
//! ```
//!
//! The delay lengths (1687, 1931, 2053, 2251 samples at 44.1 kHz) share no
//! common factors, so their echo trains do not pile up on the same samples.
//!
//! ## Allpass Filters
//!
//! Allpasses pass all frequencies at equal gain but smear the phase, turning
//! the comb echoes into a dense wash. The coefficient is fixed at 0.5.
//!
//! ```text
//! y[n]   = -g · x[n] + buf[n - D]
//! buf[n] = x[n] + g · y[n]
//! ```
//!
//! ## Stereo
//!
//! The engine runs one instance per output channel. Each owns its own buffers,
//! so the two tails evolve independently once the chorus has made L and R differ.

/// Comb delays at the 44.1 kHz reference rate.
const COMB_DELAYS: [usize; 4] = [1687, 1931, 2053, 2251];
/// Allpass delays at the 44.1 kHz reference rate.
const ALLPASS_DELAYS: [usize; 2] = [547, 331];
const REFERENCE_RATE: f32 = 44_100.0;

pub const DEFAULT_DECAY: f32 = 0.85;
pub const DEFAULT_DAMPING: f32 = 0.3;
const ALLPASS_GAIN: f32 = 0.5;

/// Scale a reference delay to `sample_rate`, never below one sample.
fn scaled_delay(reference: usize, sample_rate: f32) -> usize {
    let ratio = sample_rate / REFERENCE_RATE;
    ((reference as f32 * ratio) as usize).max(1)
}

/// Feedback comb with a one-pole damping filter (allocated once, RT-safe).
pub struct CombFilter {
    buffer: Box<[f32]>,
    write_pos: usize,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)].into_boxed_slice(),
            write_pos: 0,
            filter_state: 0.0,
        }
    }

    pub fn delay(&self) -> usize {
        self.buffer.len()
    }

    /// Return the delayed sample and write `input` plus damped feedback.
    #[inline]
    pub fn process(&mut self, input: f32, decay: f32, damping: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];

        self.filter_state = delayed * (1.0 - damping) + self.filter_state * damping;
        self.buffer[self.write_pos] = input + self.filter_state * decay;

        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        delayed
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// Schroeder allpass diffuser with a fixed coefficient.
pub struct AllpassFilter {
    buffer: Box<[f32]>,
    write_pos: usize,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)].into_boxed_slice(),
            write_pos: 0,
        }
    }

    pub fn delay(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];

        let output = -ALLPASS_GAIN * input + delayed;
        self.buffer[self.write_pos] = input + ALLPASS_GAIN * output;

        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Schroeder reverb with 4 comb filters and 2 allpass filters
pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
    decay: f32,
    damping: f32,
}

impl SchroederReverb {
    /// Create a reverb with delay lengths fixed for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            combs: COMB_DELAYS.map(|d| CombFilter::new(scaled_delay(d, sample_rate))),
            allpasses: ALLPASS_DELAYS.map(|d| AllpassFilter::new(scaled_delay(d, sample_rate))),
            decay: DEFAULT_DECAY,
            damping: DEFAULT_DAMPING,
        }
    }

    /// Comb feedback gain. Clamped below 1 so the tail always dies out.
    pub fn set_decay(&mut self, decay: f32) {
        self.decay = decay.clamp(0.0, 0.99);
    }

    /// High frequency absorption in the comb feedback path.
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 1.0);
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn comb_delays(&self) -> [usize; 4] {
        [
            self.combs[0].delay(),
            self.combs[1].delay(),
            self.combs[2].delay(),
            self.combs[3].delay(),
        ]
    }

    /// Process one sample; `mix` blends dry (0) to fully wet (1).
    #[inline]
    pub fn process(&mut self, input: f32, mix: f32) -> f32 {
        let mix = mix.clamp(0.0, 1.0);

        let mut wet = 0.0;
        for comb in &mut self.combs {
            wet += comb.process(input, self.decay, self.damping);
        }
        wet *= 0.25;

        for allpass in &mut self.allpasses {
            wet = allpass.process(wet);
        }

        input * (1.0 - mix) + wet * mix
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comb_filter_creates_echo() {
        let mut comb = CombFilter::new(10);

        // Feed an impulse
        let out1 = comb.process(1.0, 0.5, 0.0);
        assert!(out1.abs() < 0.01); // No output yet (delayed)

        for _ in 0..9 {
            comb.process(0.0, 0.5, 0.0);
        }

        let echo = comb.process(0.0, 0.5, 0.0);
        assert_eq!(echo, 1.0, "first echo is the undamped impulse");

        for _ in 0..9 {
            comb.process(0.0, 0.5, 0.0);
        }
        let second = comb.process(0.0, 0.5, 0.0);
        assert!((second - 0.5).abs() < 1e-6, "second echo scaled by decay, got {second}");
    }

    #[test]
    fn test_allpass_preserves_energy() {
        let mut allpass = AllpassFilter::new(5);

        let mut energy_in = 0.0;
        let mut energy_out = 0.0;

        for i in 0..200 {
            let input = if i < 10 { 1.0 } else { 0.0 };
            let output = allpass.process(input);
            energy_in += input * input;
            energy_out += output * output;
        }

        assert!(
            (energy_out - energy_in).abs() < energy_in * 0.05,
            "allpass changed energy: in={energy_in}, out={energy_out}"
        );
    }

    #[test]
    fn test_delays_scale_with_sample_rate() {
        assert_eq!(SchroederReverb::new(44_100.0).comb_delays(), COMB_DELAYS);
        assert_eq!(
            SchroederReverb::new(88_200.0).comb_delays(),
            [3374, 3862, 4106, 4502]
        );
    }

    #[test]
    fn test_zero_mix_is_dry() {
        let mut reverb = SchroederReverb::new(44_100.0);
        for n in 0..5_000 {
            let x = (n as f32 * 0.01).sin();
            assert_eq!(reverb.process(x, 0.0), x);
        }
    }

    #[test]
    fn test_impulse_response_decays() {
        let sample_rate = 44_100.0;
        let mut reverb = SchroederReverb::new(sample_rate);

        let window = (sample_rate * 0.5) as usize;
        let mut peaks = Vec::new();
        let mut current = 0.0f32;
        for n in 0..window * 6 {
            let input = if n == 0 { 1.0 } else { 0.0 };
            let out = reverb.process(input, 1.0);
            assert!(out.is_finite(), "reverb diverged at sample {n}");
            current = current.max(out.abs());
            if (n + 1) % window == 0 {
                peaks.push(current);
                current = 0.0;
            }
        }

        // Skip the first window (build-up); from there each half second is quieter
        for pair in peaks[1..].windows(2) {
            assert!(
                pair[1] < pair[0],
                "tail stopped decaying: {:?}",
                peaks
            );
        }
        assert!(peaks[5] < peaks[1] * 0.5);
    }

    #[test]
    fn test_reverb_stability() {
        let mut reverb = SchroederReverb::new(48_000.0);
        reverb.set_decay(5.0); // clamped to 0.99
        reverb.set_damping(0.0);
        assert_eq!(reverb.decay(), 0.99);

        for _ in 0..20_000 {
            let out = reverb.process(0.1, 1.0);
            assert!(out.is_finite(), "Reverb output should be finite");
            assert!(out.abs() < 10.0, "Reverb output unstable: {}", out);
        }
    }
}
