use crate::dsp::delay::DelayLine;
use std::f32::consts::{FRAC_PI_2, TAU};

/*
Stereo Chorus
=============

Chorus thickens a sound by mixing the dry signal with a short delayed copy
whose delay time slowly wobbles. The wobble bends the pitch of the copy up
and down by a few cents, which reads as "several players at once".

This one is modelled on the classic two-LFO string-machine chorus:

    mono in ──┬──────────────────────────────┬──(mix)──▶ left
              ├──▶ [delay L] ◀── LFO 1 ──────┘
              │
              ├──────────────────────────────┬──(mix)──▶ right
              └──▶ [delay R] ◀── LFO 2 ──────┘

Vocabulary
----------

  base delay   Centre of the delay sweep (5 ms).
  depth        How far the delay swings either side of the centre (3 ms),
               so each line reads between 2 ms and 8 ms in the past.
  mix          0 = dry only, 1 = wet only. Applied per channel.

The two LFOs run at unrelated rates (0.513 Hz and 0.863 Hz) and the right
one starts a quarter cycle ahead, so the channels never line up for long.
That drift is what produces the stereo width from a mono source.

Capacity
--------

The lines hold at least 2048 samples and always more than the longest read
(base + depth) at the construction sample rate, so the fractional read never
has to be clamped in normal operation.
*/

const LFO_RATE_LEFT: f32 = 0.513;
const LFO_RATE_RIGHT: f32 = 0.863;
const BASE_DELAY_SECONDS: f32 = 0.005;
const DEPTH_SECONDS: f32 = 0.003;
const MIN_CAPACITY: usize = 2048;

pub struct StereoChorus {
    left: DelayLine,
    right: DelayLine,
    lfo_phase_left: f32,  // cycles, [0, 1)
    lfo_phase_right: f32, // cycles, [0, 1)
    sample_rate: f32,
}

impl StereoChorus {
    pub fn new(sample_rate: f32) -> Self {
        let capacity = Self::capacity_for(sample_rate);
        Self {
            left: DelayLine::new(capacity),
            right: DelayLine::new(capacity),
            lfo_phase_left: 0.0,
            lfo_phase_right: 0.0,
            sample_rate,
        }
    }

    /// Delay-line length needed at `sample_rate`.
    pub fn capacity_for(sample_rate: f32) -> usize {
        let longest = ((BASE_DELAY_SECONDS + DEPTH_SECONDS) * sample_rate.max(0.0)).ceil() as usize;
        (longest + 2).next_power_of_two().max(MIN_CAPACITY)
    }

    pub fn capacity(&self) -> usize {
        self.left.capacity()
    }

    /// Process one mono sample into a `(left, right)` pair.
    #[inline]
    pub fn process(&mut self, input: f32, mix: f32) -> (f32, f32) {
        let mix = mix.clamp(0.0, 1.0);

        let lfo_left = (self.lfo_phase_left * TAU).sin();
        let lfo_right = (self.lfo_phase_right * TAU + FRAC_PI_2).sin();

        let delay_left = (BASE_DELAY_SECONDS + DEPTH_SECONDS * lfo_left) * self.sample_rate;
        let delay_right = (BASE_DELAY_SECONDS + DEPTH_SECONDS * lfo_right) * self.sample_rate;

        let wet_left = self.left.next_sample(input, delay_left);
        let wet_right = self.right.next_sample(input, delay_right);

        let dry = input * (1.0 - mix);
        let out = (dry + wet_left * mix, dry + wet_right * mix);

        self.lfo_phase_left = advance(self.lfo_phase_left, LFO_RATE_LEFT / self.sample_rate);
        self.lfo_phase_right = advance(self.lfo_phase_right, LFO_RATE_RIGHT / self.sample_rate);

        out
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.lfo_phase_left = 0.0;
        self.lfo_phase_right = 0.0;
    }
}

#[inline]
fn advance(phase: f32, increment: f32) -> f32 {
    let next = phase + increment;
    if next >= 1.0 {
        next - 1.0
    } else {
        next
    }
}
