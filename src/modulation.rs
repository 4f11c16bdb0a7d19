use crate::dsp::envelope::{Envelope, EnvelopeState};
use crate::dsp::lfo::Lfo;
use crate::params::{ParamRange, ParamSnapshot};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Modulation Routing
==================

Two LFOs and one mod envelope can each be pointed at a parameter. Once per
control tick the router takes the user's values (a `ParamSnapshot`) and
rewrites the targeted ones in place:

    value = base
    for each LFO aimed here:     value = clamp(value + lfo · span · 0.5)
    if the mod env aims here:    value = clamp(value + contribution)

`span` is the width of the parameter's range, so an LFO at depth 1 swings
the parameter by half its full travel either way. Clamping happens after
every addition, so two LFOs pinned against the ceiling cannot push each
other back into range.

Mod Envelope Contribution
-------------------------

    FixedAmount      amount · span            (level ignored)
    EnvelopeScaled   amount · span · level

`FixedAmount` is the default: the envelope's shape does not reach the target,
only whether a target and amount are set. `EnvelopeScaled` makes the
envelope sweep the parameter from its base toward base + amount · span.

Either way the envelope itself runs: it is gated by the engine (triggered on
every note-on, released once no key is held) and advances one step per tick.

Rates
-----

Both the LFOs and the mod envelope are stepped once per control tick, so
they are built at the control rate (sample_rate / control_block).
*/

/// A parameter the modulation sources can reach. Operators are 0-based.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModTarget {
    #[default]
    Off,
    Ratio(u8),
    Index(u8),
    FilterCutoff,
    FilterQ,
    ChorusMix,
    ReverbMix,
}

impl ModTarget {
    /// Every target an LFO can take, in menu order.
    pub const ALL: [ModTarget; 13] = [
        ModTarget::Off,
        ModTarget::Ratio(0),
        ModTarget::Ratio(1),
        ModTarget::Ratio(2),
        ModTarget::Ratio(3),
        ModTarget::Index(0),
        ModTarget::Index(1),
        ModTarget::Index(2),
        ModTarget::Index(3),
        ModTarget::FilterCutoff,
        ModTarget::FilterQ,
        ModTarget::ChorusMix,
        ModTarget::ReverbMix,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    /// Range of the parameter behind this target.
    pub fn range(self) -> Option<ParamRange> {
        match self {
            ModTarget::Off => None,
            ModTarget::Ratio(_) => Some(ParamRange::RATIO),
            ModTarget::Index(_) => Some(ParamRange::INDEX),
            ModTarget::FilterCutoff => Some(ParamRange::CUTOFF),
            ModTarget::FilterQ => Some(ParamRange::RESONANCE),
            ModTarget::ChorusMix | ModTarget::ReverbMix => Some(ParamRange::MIX),
        }
    }

    /// Short label for LFO menus.
    pub fn name(self) -> &'static str {
        match self {
            ModTarget::Off => "OFF",
            ModTarget::Ratio(0) => "Ratio1",
            ModTarget::Ratio(1) => "Ratio2",
            ModTarget::Ratio(2) => "Ratio3",
            ModTarget::Ratio(_) => "Ratio4",
            ModTarget::Index(0) => "Index1",
            ModTarget::Index(1) => "Index2",
            ModTarget::Index(2) => "Index3",
            ModTarget::Index(_) => "Index4",
            ModTarget::FilterCutoff => "Filter",
            ModTarget::FilterQ => "Res",
            ModTarget::ChorusMix => "Chorus",
            ModTarget::ReverbMix => "Reverb",
        }
    }

    /// Short label for the mod envelope menu.
    pub fn mod_env_name(self) -> &'static str {
        match self {
            ModTarget::Index(0) => "Idx1",
            ModTarget::Index(1) => "Idx2",
            ModTarget::Index(2) => "Idx3",
            ModTarget::Index(_) => "Idx4",
            other => other.name(),
        }
    }
}

/// The subset of targets the mod envelope can reach, in menu order.
pub const MOD_ENV_TARGETS: [ModTarget; 6] = [
    ModTarget::Off,
    ModTarget::Index(0),
    ModTarget::Index(1),
    ModTarget::Index(2),
    ModTarget::Index(3),
    ModTarget::FilterCutoff,
];

/// How the mod envelope's contribution is computed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModEnvMode {
    #[default]
    FixedAmount,
    EnvelopeScaled,
}

impl ModEnvMode {
    pub const ALL: [ModEnvMode; 2] = [ModEnvMode::FixedAmount, ModEnvMode::EnvelopeScaled];

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ModEnvMode::FixedAmount => "Fixed",
            ModEnvMode::EnvelopeScaled => "Env",
        }
    }
}

/// Add `amount` to the value behind `target`, clamped to its range.
#[inline]
fn offset(snapshot: &mut ParamSnapshot, target: ModTarget, amount: f32) {
    let Some(range) = target.range() else {
        return;
    };
    if let Some(value) = snapshot.target_mut(target) {
        *value = range.clamp(*value + amount);
    }
}

pub struct ModulationRouter {
    lfos: [Lfo; 2],
    mod_env: Envelope,
    lfo_values: [f32; 2],
}

impl ModulationRouter {
    /// `control_rate` is how many times per second `apply` is called.
    pub fn new(control_rate: f32) -> Self {
        Self {
            lfos: [Lfo::new(control_rate), Lfo::new(control_rate)],
            mod_env: Envelope::new(control_rate),
            lfo_values: [0.0; 2],
        }
    }

    /// Gate the mod envelope on (every note-on).
    pub fn trigger(&mut self) {
        self.mod_env.note_on();
    }

    /// Gate the mod envelope off (no key held any more).
    pub fn release(&mut self) {
        self.mod_env.note_off();
    }

    /// Advance all sources one control step and rewrite targeted values.
    pub fn apply(&mut self, snapshot: &mut ParamSnapshot) {
        for (i, lfo) in self.lfos.iter_mut().enumerate() {
            let settings = snapshot.lfo[i];
            let value = lfo.process(settings.rate, settings.depth);
            self.lfo_values[i] = value;

            if let Some(range) = settings.target.range() {
                offset(snapshot, settings.target, value * range.span() * 0.5);
            }
        }

        let env = snapshot.mod_env;
        self.mod_env.set_adsr(env.adsr);
        let level = self.mod_env.next_sample();

        if let Some(range) = env.target.range() {
            let contribution = match snapshot.mod_env_mode {
                ModEnvMode::FixedAmount => env.amount * range.span(),
                ModEnvMode::EnvelopeScaled => env.amount * range.span() * level,
            };
            offset(snapshot, env.target, contribution);
        }
    }

    /// Most recent LFO outputs, for display.
    pub fn lfo_values(&self) -> [f32; 2] {
        self.lfo_values
    }

    pub fn mod_env_level(&self) -> f32 {
        self.mod_env.level()
    }

    pub fn mod_env_state(&self) -> EnvelopeState {
        self.mod_env.state()
    }

    pub fn reset(&mut self) {
        for lfo in &mut self.lfos {
            lfo.reset();
        }
        self.mod_env.reset();
        self.lfo_values = [0.0; 2];
    }
}
