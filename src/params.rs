//! Lock-free parameter surface shared between the control and audio threads.
//!
//! Every value a user can edit lives in a single-word atomic cell. The
//! control thread stores, the audio thread loads once per control tick into
//! a plain [`ParamSnapshot`] and never touches the atomics inside the sample
//! loop.
//!
//! Consistency is per value only: a snapshot may see a new ratio together
//! with an old index, but never half of a float. Out-of-range writes are
//! clamped at the setter, never rejected.

use std::sync::atomic::{AtomicU8, Ordering};

use atomic_float::AtomicF32;

use crate::dsp::envelope::Adsr;
use crate::dsp::filter::FilterMode;
use crate::dsp::reverb::{DEFAULT_DAMPING, DEFAULT_DECAY};
use crate::modulation::{ModEnvMode, ModTarget, MOD_ENV_TARGETS};
use crate::synth::algorithm::Algorithm;
use crate::synth::voice::{DEFAULT_INDICES, DEFAULT_RATIOS};
use crate::MIN_TIME;

/// Inclusive bounds of a continuous parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    pub const RATIO: Self = Self::new(0.5, 8.0);
    pub const INDEX: Self = Self::new(0.0, 10.0);
    pub const ATTACK: Self = Self::new(MIN_TIME, 2.0);
    pub const DECAY: Self = Self::new(MIN_TIME, 2.0);
    pub const SUSTAIN: Self = Self::new(0.0, 1.0);
    pub const RELEASE: Self = Self::new(MIN_TIME, 3.0);
    pub const CUTOFF: Self = Self::new(100.0, 8000.0);
    pub const RESONANCE: Self = Self::new(0.5, 8.0);
    pub const MIX: Self = Self::new(0.0, 1.0);
    pub const REVERB_DECAY: Self = Self::new(0.0, 0.99);
    pub const REVERB_DAMPING: Self = Self::new(0.0, 1.0);
    pub const LFO_RATE: Self = Self::new(0.01, 20.0);
    pub const LFO_DEPTH: Self = Self::new(0.0, 1.0);
    pub const MOD_AMOUNT: Self = Self::new(0.0, 1.0);

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Clamp into range. NaN maps to `min`.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Position of `value` in the range as 0..1, for meters and sliders.
    pub fn normalize(&self, value: f32) -> f32 {
        ((self.clamp(value) - self.min) / self.span()).clamp(0.0, 1.0)
    }
}

/// Continuous parameter: an atomic f32 clamped into its range on every write.
#[derive(Debug)]
#[repr(align(64))]
pub struct Param {
    value: AtomicF32,
    range: ParamRange,
    default: f32,
}

impl Param {
    pub fn new(range: ParamRange, default: f32) -> Self {
        let default = range.clamp(default);
        Self {
            value: AtomicF32::new(default),
            range,
            default,
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    /// Store `value` clamped into range; returns what was stored.
    #[inline]
    pub fn set(&self, value: f32) -> f32 {
        let value = self.range.clamp(value);
        self.value.store(value, Ordering::Release);
        value
    }

    /// Add `delta` to the current value (clamped).
    pub fn nudge(&self, delta: f32) -> f32 {
        self.set(self.get() + delta)
    }

    pub fn reset(&self) {
        self.set(self.default);
    }

    pub fn range(&self) -> ParamRange {
        self.range
    }
}

/// Discrete parameter: an index into a fixed list of `count` options.
#[derive(Debug)]
pub struct ParamChoice {
    value: AtomicU8,
    count: u8,
    default: u8,
}

impl ParamChoice {
    pub fn new(count: usize, default: usize) -> Self {
        let count = count.clamp(1, u8::MAX as usize);
        let default = default.min(count - 1) as u8;
        let count = count as u8;
        Self {
            value: AtomicU8::new(default),
            count,
            default,
        }
    }

    #[inline]
    pub fn get(&self) -> usize {
        self.value.load(Ordering::Acquire) as usize
    }

    /// Store `index`, clamped to the last option.
    #[inline]
    pub fn set(&self, index: usize) -> usize {
        let index = index.min(self.count as usize - 1);
        self.value.store(index as u8, Ordering::Release);
        index
    }

    /// Step forward, wrapping past the last option.
    pub fn cycle(&self) -> usize {
        self.set((self.get() + 1) % self.count as usize)
    }

    pub fn reset(&self) {
        self.set(self.default as usize);
    }

    pub fn count(&self) -> usize {
        self.count as usize
    }
}

pub struct LfoParams {
    pub rate: Param,
    pub depth: Param,
    /// Index into `ModTarget::ALL`.
    pub target: ParamChoice,
}

impl LfoParams {
    fn new(rate: f32) -> Self {
        Self {
            rate: Param::new(ParamRange::LFO_RATE, rate),
            depth: Param::new(ParamRange::LFO_DEPTH, 0.0),
            target: ParamChoice::new(ModTarget::ALL.len(), 0),
        }
    }
}

pub struct ModEnvParams {
    pub attack: Param,
    pub decay: Param,
    pub sustain: Param,
    pub release: Param,
    pub amount: Param,
    /// Index into `MOD_ENV_TARGETS`.
    pub target: ParamChoice,
}

/// Everything the control thread may edit while audio is running.
pub struct SynthParams {
    pub ratio: [Param; 4],
    pub index: [Param; 4],
    pub algorithm: ParamChoice,

    pub attack: Param,
    pub decay: Param,
    pub sustain: Param,
    pub release: Param,

    pub filter_mode: ParamChoice,
    pub cutoff: Param,
    pub resonance: Param,

    pub chorus_mix: Param,
    pub reverb_mix: Param,
    /// Comb feedback gain.
    pub reverb_decay: Param,
    pub reverb_damping: Param,

    pub lfo: [LfoParams; 2],
    pub mod_env: ModEnvParams,
    pub mod_env_mode: ParamChoice,
}

impl Default for SynthParams {
    fn default() -> Self {
        let adsr = Adsr::default();
        Self {
            ratio: DEFAULT_RATIOS.map(|r| Param::new(ParamRange::RATIO, r)),
            index: DEFAULT_INDICES.map(|i| Param::new(ParamRange::INDEX, i)),
            algorithm: ParamChoice::new(Algorithm::COUNT, 0),

            attack: Param::new(ParamRange::ATTACK, adsr.attack),
            decay: Param::new(ParamRange::DECAY, adsr.decay),
            sustain: Param::new(ParamRange::SUSTAIN, adsr.sustain),
            release: Param::new(ParamRange::RELEASE, adsr.release),

            filter_mode: ParamChoice::new(FilterMode::ALL.len(), 0),
            cutoff: Param::new(ParamRange::CUTOFF, 2000.0),
            resonance: Param::new(ParamRange::RESONANCE, 0.707),

            chorus_mix: Param::new(ParamRange::MIX, 0.0),
            reverb_mix: Param::new(ParamRange::MIX, 0.0),
            reverb_decay: Param::new(ParamRange::REVERB_DECAY, DEFAULT_DECAY),
            reverb_damping: Param::new(ParamRange::REVERB_DAMPING, DEFAULT_DAMPING),

            lfo: [LfoParams::new(2.0), LfoParams::new(4.0)],
            mod_env: ModEnvParams {
                attack: Param::new(ParamRange::ATTACK, 0.01),
                decay: Param::new(ParamRange::DECAY, 0.3),
                sustain: Param::new(ParamRange::SUSTAIN, 0.0),
                release: Param::new(ParamRange::RELEASE, 0.2),
                amount: Param::new(ParamRange::MOD_AMOUNT, 0.0),
                target: ParamChoice::new(MOD_ENV_TARGETS.len(), 0),
            },
            mod_env_mode: ParamChoice::new(ModEnvMode::ALL.len(), 0),
        }
    }
}

impl SynthParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every cell once into a plain copy.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            ratio: [0, 1, 2, 3].map(|i| self.ratio[i].get()),
            index: [0, 1, 2, 3].map(|i| self.index[i].get()),
            algorithm: Algorithm::from_index(self.algorithm.get()),
            adsr: Adsr {
                attack: self.attack.get(),
                decay: self.decay.get(),
                sustain: self.sustain.get(),
                release: self.release.get(),
            },
            filter_mode: FilterMode::from_index(self.filter_mode.get()),
            cutoff: self.cutoff.get(),
            resonance: self.resonance.get(),
            chorus_mix: self.chorus_mix.get(),
            reverb_mix: self.reverb_mix.get(),
            reverb_decay: self.reverb_decay.get(),
            reverb_damping: self.reverb_damping.get(),
            lfo: [0, 1].map(|i| LfoSettings {
                rate: self.lfo[i].rate.get(),
                depth: self.lfo[i].depth.get(),
                target: ModTarget::from_index(self.lfo[i].target.get()),
            }),
            mod_env: ModEnvSettings {
                adsr: Adsr {
                    attack: self.mod_env.attack.get(),
                    decay: self.mod_env.decay.get(),
                    sustain: self.mod_env.sustain.get(),
                    release: self.mod_env.release.get(),
                },
                amount: self.mod_env.amount.get(),
                target: MOD_ENV_TARGETS
                    .get(self.mod_env.target.get())
                    .copied()
                    .unwrap_or(ModTarget::Off),
            },
            mod_env_mode: ModEnvMode::from_index(self.mod_env_mode.get()),
        }
    }

    pub fn set_algorithm(&self, algorithm: Algorithm) {
        self.algorithm.set(algorithm.index());
    }

    pub fn set_filter_mode(&self, mode: FilterMode) {
        self.filter_mode.set(mode.index());
    }

    pub fn set_mod_env_mode(&self, mode: ModEnvMode) {
        self.mod_env_mode.set(mode.index());
    }

    /// Route LFO `lfo` (0 or 1) to `target`. Out-of-range LFOs are ignored.
    pub fn set_lfo_target(&self, lfo: usize, target: ModTarget) {
        if let Some(lfo) = self.lfo.get(lfo) {
            lfo.target.set(target.index());
        }
    }

    /// Route the mod envelope. Targets it cannot reach turn it off.
    pub fn set_mod_env_target(&self, target: ModTarget) {
        let index = MOD_ENV_TARGETS
            .iter()
            .position(|&t| t == target)
            .unwrap_or(0);
        self.mod_env.target.set(index);
    }

    /// Look up the continuous cell a modulation target points at.
    pub fn target(&self, target: ModTarget) -> Option<&Param> {
        match target {
            ModTarget::Off => None,
            ModTarget::Ratio(op) => self.ratio.get(op as usize),
            ModTarget::Index(op) => self.index.get(op as usize),
            ModTarget::FilterCutoff => Some(&self.cutoff),
            ModTarget::FilterQ => Some(&self.resonance),
            ModTarget::ChorusMix => Some(&self.chorus_mix),
            ModTarget::ReverbMix => Some(&self.reverb_mix),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoSettings {
    pub rate: f32,
    pub depth: f32,
    pub target: ModTarget,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModEnvSettings {
    pub adsr: Adsr,
    pub amount: f32,
    pub target: ModTarget,
}

/// Plain copy of `SynthParams`, taken once per control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub ratio: [f32; 4],
    pub index: [f32; 4],
    pub algorithm: Algorithm,
    pub adsr: Adsr,
    pub filter_mode: FilterMode,
    pub cutoff: f32,
    pub resonance: f32,
    pub chorus_mix: f32,
    pub reverb_mix: f32,
    pub reverb_decay: f32,
    pub reverb_damping: f32,
    pub lfo: [LfoSettings; 2],
    pub mod_env: ModEnvSettings,
    pub mod_env_mode: ModEnvMode,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        SynthParams::default().snapshot()
    }
}

impl ParamSnapshot {
    /// Mutable access to the value a modulation target points at.
    pub fn target_mut(&mut self, target: ModTarget) -> Option<&mut f32> {
        match target {
            ModTarget::Off => None,
            ModTarget::Ratio(op) => self.ratio.get_mut(op as usize),
            ModTarget::Index(op) => self.index.get_mut(op as usize),
            ModTarget::FilterCutoff => Some(&mut self.cutoff),
            ModTarget::FilterQ => Some(&mut self.resonance),
            ModTarget::ChorusMix => Some(&mut self.chorus_mix),
            ModTarget::ReverbMix => Some(&mut self.reverb_mix),
        }
    }
}
