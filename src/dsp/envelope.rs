use crate::MIN_TIME;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

This module implements a linear ADSR envelope generator, the amplitude
shaper of every FM voice (and of the secondary modulation envelope).

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the audio signal to control its amplitude over time.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  gate        The note on/off signal. Gate high (note_on) triggers Attack.
              Gate low (note_off) triggers Release from wherever we are.

  increment   How much `level` changes per sample. Calculated from the stage
              duration and sample rate whenever a time parameter changes.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)


The Math: Time to Increment
---------------------------

    attack_increment  = 1.0 / (attack_time * sample_rate)
    decay_increment   = (1.0 - sustain) / (decay_time * sample_rate)
    release_increment = level_at_note_off / (release_time * sample_rate)

Attack and decay increments are cached and recomputed by the setters.
Release is special: it is computed at the moment of note_off from the
*current* level, so a release always lasts `release_time` seconds no matter
where the envelope was when the key went up.


The State Machine
-----------------

    Idle ──note_on──→ Attack ──level≥1──→ Decay ──level≤S──→ Sustain
                        │                   │                   │
                        └──────note_off─────┴─────note_off──────┘
                                            ↓
                                         Release ──level≤0──→ Idle

note_on from any stage (even mid-release) restarts Attack from the current
level instead of snapping to zero. Retriggering a sounding voice therefore
ramps up smoothly with no click.


Clamping
--------

All time parameters are floored to MIN_TIME (1ms) and sustain is clamped to
[0, 1] at the setters. The per-sample path never divides, so it can never
produce inf/NaN from a bad parameter.
*/

/// Attack finishes once the level is this close to 1.0 (absorbs f32 ramp error).
const ATTACK_EPSILON: f32 = 1e-4;

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate just went high, ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

/// ADSR times and sustain level, as plain values.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
        }
    }
}

pub struct Envelope {
    // ADSR parameters (define the envelope shape)
    attack_time: f32,   // seconds to ramp 0 → 1
    decay_time: f32,    // seconds to ramp 1 → sustain
    sustain_level: f32, // level to hold (0.0 - 1.0)
    release_time: f32,  // seconds to ramp current → 0
    sample_rate: f32,

    // Runtime state (changes every sample)
    stage: EnvelopeState,
    level: f32,

    // Cached per-sample steps
    attack_increment: f32,
    decay_increment: f32,
    release_increment: f32, // captured at note_off
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_adsr(sample_rate, Adsr::default())
    }

    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self::with_adsr(
            sample_rate,
            Adsr {
                attack,
                decay,
                sustain,
                release,
            },
        )
    }

    pub fn with_adsr(sample_rate: f32, adsr: Adsr) -> Self {
        let mut env = Self {
            attack_time: adsr.attack.max(MIN_TIME),
            decay_time: adsr.decay.max(MIN_TIME),
            sustain_level: adsr.sustain.clamp(0.0, 1.0),
            release_time: adsr.release.max(MIN_TIME),
            sample_rate,

            stage: EnvelopeState::Idle,
            level: 0.0,

            attack_increment: 0.0,
            decay_increment: 0.0,
            release_increment: 0.0,
        };
        env.update_increments();
        env
    }

    /// Gate high: (re)start the attack phase from the current level.
    pub fn note_on(&mut self) {
        self.stage = EnvelopeState::Attack;
    }

    /// Gate low: start the release phase from the current level.
    pub fn note_off(&mut self) {
        if self.stage == EnvelopeState::Idle {
            return;
        }

        // Snapshot the slope so release takes release_time from *this* level
        self.release_increment = self.level / (self.release_time * self.sample_rate);
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += self.attack_increment;

                if self.level >= 1.0 - ATTACK_EPSILON {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                self.level -= self.decay_increment;

                if self.level <= self.sustain_level {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                // Hold at sustain level until gate goes low
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                self.level -= self.release_increment;

                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    /// Force the envelope back to idle at level 0.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_increment = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_time = seconds.max(MIN_TIME);
        self.update_increments();
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.decay_time = seconds.max(MIN_TIME);
        self.update_increments();
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.sustain_level = level.clamp(0.0, 1.0);
        self.update_increments();
    }

    /// Takes effect on the next note_off; a running release keeps its slope.
    pub fn set_release(&mut self, seconds: f32) {
        self.release_time = seconds.max(MIN_TIME);
    }

    /// Apply all four parameters, skipping the recompute when nothing changed.
    pub fn set_adsr(&mut self, adsr: Adsr) {
        if adsr != self.settings() {
            self.attack_time = adsr.attack.max(MIN_TIME);
            self.decay_time = adsr.decay.max(MIN_TIME);
            self.sustain_level = adsr.sustain.clamp(0.0, 1.0);
            self.release_time = adsr.release.max(MIN_TIME);
            self.update_increments();
        }
    }

    /// Current (clamped) parameters.
    pub fn settings(&self) -> Adsr {
        Adsr {
            attack: self.attack_time,
            decay: self.decay_time,
            sustain: self.sustain_level,
            release: self.release_time,
        }
    }

    fn update_increments(&mut self) {
        self.attack_increment = 1.0 / (self.attack_time * self.sample_rate);
        self.decay_increment = (1.0 - self.sustain_level) / (self.decay_time * self.sample_rate);
    }
}
