//! Presets: plain records mirroring the parameter surface.
//!
//! A preset is applied by writing every field through the clamping setters in
//! [`SynthParams`], so values outside a parameter's range (the Keys ratio of
//! 14, for example) land on the nearest bound instead of being rejected.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::Adsr;
use crate::dsp::filter::FilterMode;
use crate::dsp::reverb::{DEFAULT_DAMPING, DEFAULT_DECAY};
use crate::error::{Result, SynthError};
use crate::modulation::{ModEnvMode, ModTarget};
use crate::params::SynthParams;
use crate::synth::algorithm::Algorithm;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoPreset {
    pub rate: f32,
    pub depth: f32,
    pub target: ModTarget,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModEnvPreset {
    pub adsr: Adsr,
    pub amount: f32,
    pub target: ModTarget,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
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
    pub lfo: [LfoPreset; 2],
    pub mod_env: ModEnvPreset,
    pub mod_env_mode: ModEnvMode,
}

impl Default for Preset {
    /// Shared baseline every factory preset starts from.
    fn default() -> Self {
        Self {
            name: "Init".to_string(),
            ratio: [1.0; 4],
            index: [0.0; 4],
            algorithm: Algorithm::Stack,
            adsr: Adsr::default(),
            filter_mode: FilterMode::Off,
            cutoff: 2000.0,
            resonance: 0.707,
            chorus_mix: 0.0,
            reverb_mix: 0.0,
            reverb_decay: DEFAULT_DECAY,
            reverb_damping: DEFAULT_DAMPING,
            lfo: [
                LfoPreset {
                    rate: 2.0,
                    depth: 0.0,
                    target: ModTarget::Off,
                },
                LfoPreset {
                    rate: 4.0,
                    depth: 0.0,
                    target: ModTarget::Off,
                },
            ],
            mod_env: ModEnvPreset {
                adsr: Adsr {
                    attack: 0.01,
                    decay: 0.3,
                    sustain: 0.0,
                    release: 0.2,
                },
                amount: 0.0,
                target: ModTarget::Off,
            },
            mod_env_mode: ModEnvMode::FixedAmount,
        }
    }
}

impl Preset {
    /// Write every field into `params`. Each value is clamped by its cell.
    pub fn apply(&self, params: &SynthParams) {
        for (cell, &value) in params.ratio.iter().zip(&self.ratio) {
            cell.set(value);
        }
        for (cell, &value) in params.index.iter().zip(&self.index) {
            cell.set(value);
        }
        params.set_algorithm(self.algorithm);

        params.attack.set(self.adsr.attack);
        params.decay.set(self.adsr.decay);
        params.sustain.set(self.adsr.sustain);
        params.release.set(self.adsr.release);

        params.set_filter_mode(self.filter_mode);
        params.cutoff.set(self.cutoff);
        params.resonance.set(self.resonance);

        params.chorus_mix.set(self.chorus_mix);
        params.reverb_mix.set(self.reverb_mix);
        params.reverb_decay.set(self.reverb_decay);
        params.reverb_damping.set(self.reverb_damping);

        for (i, lfo) in self.lfo.iter().enumerate() {
            params.lfo[i].rate.set(lfo.rate);
            params.lfo[i].depth.set(lfo.depth);
            params.set_lfo_target(i, lfo.target);
        }

        params.mod_env.attack.set(self.mod_env.adsr.attack);
        params.mod_env.decay.set(self.mod_env.adsr.decay);
        params.mod_env.sustain.set(self.mod_env.adsr.sustain);
        params.mod_env.release.set(self.mod_env.adsr.release);
        params.mod_env.amount.set(self.mod_env.amount);
        params.set_mod_env_target(self.mod_env.target);
        params.set_mod_env_mode(self.mod_env_mode);
    }

    /// Read the current (unmodulated) parameter values into a preset.
    pub fn capture(name: &str, params: &SynthParams) -> Self {
        let snapshot = params.snapshot();
        Self {
            name: name.to_string(),
            ratio: snapshot.ratio,
            index: snapshot.index,
            algorithm: snapshot.algorithm,
            adsr: snapshot.adsr,
            filter_mode: snapshot.filter_mode,
            cutoff: snapshot.cutoff,
            resonance: snapshot.resonance,
            chorus_mix: snapshot.chorus_mix,
            reverb_mix: snapshot.reverb_mix,
            reverb_decay: snapshot.reverb_decay,
            reverb_damping: snapshot.reverb_damping,
            lfo: snapshot.lfo.map(|lfo| LfoPreset {
                rate: lfo.rate,
                depth: lfo.depth,
                target: lfo.target,
            }),
            mod_env: ModEnvPreset {
                adsr: snapshot.mod_env.adsr,
                amount: snapshot.mod_env.amount,
                target: snapshot.mod_env.target,
            },
            mod_env_mode: snapshot.mod_env_mode,
        }
    }
}

fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Adsr {
    Adsr {
        attack,
        decay,
        sustain,
        release,
    }
}

fn lfo1(base: &Preset, rate: f32, depth: f32, target: ModTarget) -> [LfoPreset; 2] {
    [LfoPreset { rate, depth, target }, base.lfo[1]]
}

/// Names of the built-in presets, in bank order.
pub const FACTORY_NAMES: [&str; 8] = ["Init", "Bass", "Lead", "Pad", "Keys", "Bell", "Brass", "Strings"];

/// The built-in bank.
pub fn factory_presets() -> Vec<Preset> {
    let base = Preset::default();
    let named = |name: &str| Preset {
        name: name.to_string(),
        ..base.clone()
    };

    vec![
        // Pure sine
        Preset {
            adsr: adsr(0.01, 0.1, 1.0, 0.2),
            ..named("Init")
        },
        // Solid DX-style bass, mod env plucks index 2
        Preset {
            index: [0.8, 2.5, 1.5, 0.5],
            adsr: adsr(0.001, 0.15, 0.6, 0.1),
            mod_env: ModEnvPreset {
                adsr: adsr(0.001, 0.2, 0.0, 0.1),
                amount: 0.6,
                target: ModTarget::Index(1),
            },
            ..named("Bass")
        },
        Preset {
            ratio: [1.0, 2.0, 3.0, 4.0],
            index: [0.5, 3.0, 2.0, 1.0],
            adsr: adsr(0.01, 0.2, 0.8, 0.3),
            lfo: lfo1(&base, 5.0, 0.15, ModTarget::Index(1)),
            ..named("Lead")
        },
        Preset {
            ratio: [1.0, 2.0, 1.0, 0.5],
            index: [0.3, 1.5, 0.8, 0.4],
            adsr: adsr(0.8, 0.5, 0.7, 1.2),
            algorithm: Algorithm::DualCarrier,
            chorus_mix: 0.4,
            reverb_mix: 0.3,
            lfo: lfo1(&base, 0.8, 0.1, ModTarget::Index(1)),
            ..named("Pad")
        },
        // Electric piano; the 14:1 tine ratio clamps to the ratio ceiling
        Preset {
            ratio: [1.0, 14.0, 1.0, 1.0],
            index: [0.0, 1.8, 0.0, 0.0],
            adsr: adsr(0.001, 0.8, 0.2, 0.4),
            mod_env: ModEnvPreset {
                adsr: adsr(0.001, 0.5, 0.0, 0.2),
                amount: 0.8,
                target: ModTarget::Index(1),
            },
            reverb_mix: 0.15,
            ..named("Keys")
        },
        Preset {
            ratio: [1.0, 3.5, 1.0, 7.0],
            index: [0.0, 2.5, 0.0, 1.5],
            adsr: adsr(0.001, 2.0, 0.0, 1.5),
            algorithm: Algorithm::DualCarrier,
            reverb_mix: 0.4,
            reverb_decay: 0.93,
            reverb_damping: 0.15,
            ..named("Bell")
        },
        Preset {
            ratio: [1.0, 1.0, 2.0, 3.0],
            index: [0.5, 2.0, 1.8, 1.2],
            adsr: adsr(0.08, 0.1, 0.9, 0.15),
            mod_env: ModEnvPreset {
                adsr: adsr(0.1, 0.2, 0.7, 0.1),
                amount: 0.5,
                target: ModTarget::Index(1),
            },
            ..named("Brass")
        },
        Preset {
            ratio: [1.0, 2.0, 1.0, 3.0],
            index: [0.2, 1.0, 0.3, 0.8],
            adsr: adsr(0.4, 0.3, 0.8, 0.5),
            algorithm: Algorithm::DualCarrier,
            chorus_mix: 0.5,
            reverb_mix: 0.25,
            lfo: lfo1(&base, 5.5, 0.08, ModTarget::Ratio(0)),
            ..named("Strings")
        },
    ]
}

/// Find a factory preset by name (case-insensitive).
pub fn factory_preset(name: &str) -> Result<Preset> {
    factory_presets()
        .into_iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| SynthError::UnknownPreset(name.to_string()))
}
