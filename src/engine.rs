//! The engine: one owned aggregate holding every voice and effect.
//!
//! ```text
//!  control thread                          audio thread
//!  ──────────────                          ────────────
//!  SynthHandle ──rtrb──▶ SynthMessage ──▶  FmEngine::next_frame()
//!       │                                      │
//!       └── Arc<SynthParams> (atomics) ◀───────┤ snapshot every control block
//!       └── Arc<Monitor>     (atomics) ◀───────┘ scope + voice status
//! ```
//!
//! Per sample, in this order:
//!
//! ```text
//!  Σ voices · master_gain → filter (unless Off) → chorus (mono → L/R)
//!        → reverb L / reverb R → tanh → output, and (L+R)/2 → scope
//! ```
//!
//! Every `control_block` samples a control tick runs first:
//!
//! 1. snapshot the shared parameters
//! 2. run the modulation router over the snapshot
//! 3. push ratios, indices, algorithm and ADSR into every voice
//! 4. recompute the filter coefficients
//! 5. drain queued note messages
//!
//! Nothing here allocates, locks or logs once the engine is built.

use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::chorus::StereoChorus;
use crate::dsp::filter::{Biquad, FilterMode};
use crate::dsp::reverb::SchroederReverb;
use crate::dsp::saturation::soft_clip_stereo;
use crate::error::{Result, SynthError};
use crate::io::{midi_note_to_freq, midi_to_synth, MidiEvent};
use crate::modulation::ModulationRouter;
use crate::monitor::{ModulationStatus, Monitor, VoiceStatus};
use crate::params::{ParamSnapshot, SynthParams};
use crate::patch::{factory_preset, Preset};
use crate::synth::message::{MessageReceiver, NoMessages, SynthMessage};
use crate::synth::pool::{Allocation, StealPolicy, VoicePool, MAX_NOTE};
use crate::synth::voice::DEFAULT_AMPLITUDE;
use crate::{DEFAULT_SAMPLE_RATE, MAX_BLOCK_SIZE};

/// Note messages that can be queued between two control ticks.
pub const MESSAGE_QUEUE_CAPACITY: usize = 256;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub polyphony: usize,
    /// Samples between control ticks.
    pub control_block: usize,
    /// Length of the observation ring.
    pub scope_size: usize,
    /// Gain on the voice sum before the effects.
    pub master_gain: f32,
    /// Per-voice output scale.
    pub voice_amplitude: f32,
    pub steal_policy: StealPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            polyphony: 6,
            control_block: 64,
            scope_size: 512,
            master_gain: 0.4,
            voice_amplitude: DEFAULT_AMPLITUDE,
            steal_policy: StealPolicy::FirstSlot,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_polyphony(mut self, polyphony: usize) -> Self {
        self.polyphony = polyphony;
        self
    }

    pub fn with_steal_policy(mut self, policy: StealPolicy) -> Self {
        self.steal_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SynthError::InvalidConfig("sample rate must be positive"));
        }
        if self.polyphony == 0 {
            return Err(SynthError::InvalidConfig("polyphony must be at least 1"));
        }
        if self.control_block == 0 || self.control_block > MAX_BLOCK_SIZE {
            return Err(SynthError::InvalidConfig(
                "control block must be between 1 and MAX_BLOCK_SIZE",
            ));
        }
        if self.scope_size == 0 {
            return Err(SynthError::InvalidConfig("scope size must be at least 1"));
        }
        if !(self.master_gain.is_finite() && self.master_gain >= 0.0) {
            return Err(SynthError::InvalidConfig("master gain must be non-negative"));
        }
        if !(self.voice_amplitude.is_finite() && self.voice_amplitude >= 0.0) {
            return Err(SynthError::InvalidConfig("voice amplitude must be non-negative"));
        }
        Ok(())
    }

    /// Rate at which the LFOs and the mod envelope are stepped.
    pub fn control_rate(&self) -> f32 {
        self.sample_rate / self.control_block as f32
    }
}

pub struct FmEngine<R: MessageReceiver = Consumer<SynthMessage>> {
    config: EngineConfig,
    params: Arc<SynthParams>,
    monitor: Arc<Monitor>,
    rx: R,

    pool: VoicePool,
    router: ModulationRouter,
    filter: Biquad,
    chorus: StereoChorus,
    reverb_left: SchroederReverb,
    reverb_right: SchroederReverb,

    /// Modulated parameter values in effect until the next tick.
    current: ParamSnapshot,
    countdown: usize,
}

impl FmEngine {
    /// Build an engine for the audio thread and its control-thread handle.
    pub fn new(config: EngineConfig) -> Result<(Self, SynthHandle)> {
        let params = Arc::new(SynthParams::default());
        let monitor = Arc::new(Monitor::new(config.scope_size, config.polyphony));
        let (tx, rx) = RingBuffer::new(MESSAGE_QUEUE_CAPACITY);

        let engine = Self::with_receiver(config, Arc::clone(&params), Arc::clone(&monitor), rx)?;
        let handle = SynthHandle {
            tx,
            params,
            monitor,
            channel: 0,
        };
        Ok((engine, handle))
    }
}

impl FmEngine<NoMessages> {
    /// Engine driven directly through `note_on`/`note_off`, with no queue.
    pub fn standalone(config: EngineConfig) -> Result<Self> {
        let params = Arc::new(SynthParams::default());
        let monitor = Arc::new(Monitor::new(config.scope_size, config.polyphony));
        Self::with_receiver(config, params, monitor, NoMessages)
    }
}

impl<R: MessageReceiver> FmEngine<R> {
    pub fn with_receiver(
        config: EngineConfig,
        params: Arc<SynthParams>,
        monitor: Arc<Monitor>,
        rx: R,
    ) -> Result<Self> {
        config.validate()?;

        let sample_rate = config.sample_rate;
        let mut engine = Self {
            pool: VoicePool::new(sample_rate, config.polyphony, config.voice_amplitude)
                .with_policy(config.steal_policy),
            router: ModulationRouter::new(config.control_rate()),
            filter: Biquad::new(sample_rate),
            chorus: StereoChorus::new(sample_rate),
            reverb_left: SchroederReverb::new(sample_rate),
            reverb_right: SchroederReverb::new(sample_rate),
            current: params.snapshot(),
            countdown: 0,
            config,
            params,
            monitor,
            rx,
        };
        engine.push_to_voices();

        log::info!(
            "fm engine ready: {} Hz, {} voices, control every {} samples",
            config.sample_rate,
            config.polyphony,
            config.control_block
        );
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &Arc<SynthParams> {
        &self.params
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    /// Parameter values after modulation, as applied at the last tick.
    pub fn current_params(&self) -> &ParamSnapshot {
        &self.current
    }

    pub fn router(&self) -> &ModulationRouter {
        &self.router
    }

    /// Left and right reverb tanks.
    pub fn reverbs(&self) -> [&SchroederReverb; 2] {
        [&self.reverb_left, &self.reverb_right]
    }

    pub fn note_on(&mut self, note: u8, frequency: f32) -> Allocation {
        let allocation = self.pool.note_on(note, frequency);
        if allocation.index().is_some() {
            self.router.trigger();
        }
        allocation
    }

    pub fn note_off(&mut self, note: u8) -> Option<usize> {
        let released = self.pool.note_off(note);
        if released.is_some() && self.pool.held_notes() == 0 {
            self.router.release();
        }
        released
    }

    pub fn all_notes_off(&mut self) {
        self.pool.all_notes_off();
        self.router.release();
    }

    pub fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note, frequency } => {
                self.note_on(note, frequency);
            }
            SynthMessage::NoteOff { note } => {
                self.note_off(note);
            }
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Produce one stereo sample pair.
    #[inline]
    pub fn next_frame(&mut self) -> (f32, f32) {
        if self.countdown == 0 {
            self.control_tick();
            self.countdown = self.config.control_block;
        }
        self.countdown -= 1;

        let mono = self.pool.process() * self.config.master_gain;
        let filtered = match self.current.filter_mode {
            FilterMode::Off => mono,
            _ => self.filter.process(mono),
        };

        let (left, right) = self.chorus.process(filtered, self.current.chorus_mix);
        let left = self.reverb_left.process(left, self.current.reverb_mix);
        let right = self.reverb_right.process(right, self.current.reverb_mix);

        let (left, right) = soft_clip_stereo((left, right));
        self.monitor.scope().push((left + right) * 0.5);
        (left, right)
    }

    /// Fill separate left/right buffers (the shorter length wins).
    pub fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.next_frame();
        }
    }

    /// Fill an interleaved device buffer. Mono gets (L+R)/2; channels past
    /// the second are silent.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for frame in out.chunks_mut(channels) {
            let (left, right) = self.next_frame();
            match frame {
                [mono] => *mono = (left + right) * 0.5,
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(0.0);
                }
                [] => {}
            }
        }
    }

    /// Silence every voice and clear all effect tails.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.router.reset();
        self.filter.reset();
        self.chorus.reset();
        self.reverb_left.reset();
        self.reverb_right.reset();
        self.monitor.scope().clear();
        self.countdown = 0;
    }

    fn control_tick(&mut self) {
        let mut snapshot = self.params.snapshot();
        self.router.apply(&mut snapshot);
        self.current = snapshot;

        self.push_to_voices();
        self.filter
            .configure(snapshot.filter_mode, snapshot.cutoff, snapshot.resonance);
        for reverb in [&mut self.reverb_left, &mut self.reverb_right] {
            reverb.set_decay(snapshot.reverb_decay);
            reverb.set_damping(snapshot.reverb_damping);
        }

        while let Some(message) = self.rx.pop() {
            self.handle_message(message);
        }

        self.publish_status();
    }

    fn push_to_voices(&mut self) {
        let snapshot = self.current;
        for voice in self.pool.voices_mut() {
            voice.set_ratios(snapshot.ratio);
            voice.set_indices(snapshot.index);
            voice.set_algorithm(snapshot.algorithm);
            voice.set_adsr(snapshot.adsr);
        }
    }

    fn publish_status(&self) {
        self.monitor.publish_modulation(ModulationStatus {
            lfo: self.router.lfo_values(),
            mod_env: self.router.mod_env_level(),
        });
        for index in 0..self.pool.polyphony() {
            if let Some(voice) = self.pool.voice(index) {
                self.monitor.publish_voice(
                    index,
                    VoiceStatus {
                        active: voice.is_active(),
                        note: self.pool.note_at(index),
                        level: voice.envelope_level(),
                    },
                );
            }
        }
    }
}

/// Control-thread side: note queue producer plus the shared surfaces.
pub struct SynthHandle {
    tx: Producer<SynthMessage>,
    params: Arc<SynthParams>,
    monitor: Arc<Monitor>,
    channel: u8,
}

impl SynthHandle {
    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// MIDI channel accepted by `send_midi`.
    pub fn set_channel(&mut self, channel: u8) {
        self.channel = channel & 0x0F;
    }

    /// Queue a note-on with equal-tempered tuning.
    pub fn note_on(&mut self, note: u8) -> Result<()> {
        self.note_on_with_frequency(note, midi_note_to_freq(note))
    }

    pub fn note_on_with_frequency(&mut self, note: u8, frequency: f32) -> Result<()> {
        if note > MAX_NOTE {
            log::warn!("dropping note on {note}: outside the MIDI range");
            return Err(SynthError::InvalidNote(note));
        }
        log::debug!("note on {note} ({frequency:.2} Hz)");
        self.send(SynthMessage::NoteOn { note, frequency })
    }

    pub fn note_off(&mut self, note: u8) -> Result<()> {
        log::debug!("note off {note}");
        self.send(SynthMessage::NoteOff { note })
    }

    pub fn all_notes_off(&mut self) -> Result<()> {
        log::debug!("all notes off");
        self.send(SynthMessage::AllNotesOff)
    }

    /// Forward a MIDI event; events the engine ignores are dropped quietly.
    pub fn send_midi(&mut self, event: MidiEvent) -> Result<()> {
        match midi_to_synth(event, self.channel) {
            Some(message) => self.send(message),
            None => {
                log::trace!("ignoring midi event {event:?}");
                Ok(())
            }
        }
    }

    pub fn send(&mut self, message: SynthMessage) -> Result<()> {
        self.tx.push(message).map_err(|_| {
            log::warn!("note queue full, dropping {message:?}");
            SynthError::QueueFull
        })
    }

    pub fn apply_preset(&self, preset: &Preset) {
        log::info!("applying preset {}", preset.name);
        preset.apply(&self.params);
    }

    /// Apply a factory preset by name.
    pub fn load_preset(&self, name: &str) -> Result<Preset> {
        let preset = factory_preset(name).inspect_err(|err| log::warn!("{err}"))?;
        self.apply_preset(&preset);
        Ok(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::algorithm::Algorithm;

    fn render(engine: &mut FmEngine<impl MessageReceiver>, frames: usize) -> Vec<(f32, f32)> {
        (0..frames).map(|_| engine.next_frame()).collect()
    }

    #[test]
    fn config_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let bad = [
            EngineConfig::default().with_sample_rate(0.0),
            EngineConfig::default().with_sample_rate(f32::NAN),
            EngineConfig::default().with_polyphony(0),
            EngineConfig {
                control_block: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                scope_size: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                master_gain: -1.0,
                ..EngineConfig::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(SynthError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
            assert!(FmEngine::standalone(config).is_err());
        }
    }

    #[test]
    fn very_low_sample_rate_renders_without_panicking() {
        let config = EngineConfig::default().with_sample_rate(16.0);
        assert!(config.validate().is_ok());

        let mut engine = FmEngine::standalone(config).unwrap();
        engine.params().set_filter_mode(FilterMode::LowPass);
        engine.params().chorus_mix.set(0.5);
        engine.params().reverb_mix.set(0.5);
        engine.note_on(69, 440.0);

        for (left, right) in render(&mut engine, 1_000) {
            assert!(left.abs() <= 1.0 && right.abs() <= 1.0, "{left}, {right}");
        }

        engine.params().set_filter_mode(FilterMode::HighPass);
        assert!(render(&mut engine, 256).iter().all(|(l, r)| l.is_finite() && r.is_finite()));
    }

    #[test]
    fn silent_without_notes() {
        let mut engine = FmEngine::standalone(EngineConfig::default()).unwrap();
        for (left, right) in render(&mut engine, 2_000) {
            assert_eq!(left, 0.0);
            assert_eq!(right, 0.0);
        }
    }

    #[test]
    fn note_produces_bounded_stereo_output() {
        let mut engine = FmEngine::standalone(EngineConfig::default()).unwrap();
        engine.params().chorus_mix.set(0.5);
        engine.params().reverb_mix.set(0.5);
        engine.note_on(69, 440.0);

        let frames = render(&mut engine, 10_000);
        let peak = frames
            .iter()
            .fold(0.0f32, |acc, (l, r)| acc.max(l.abs()).max(r.abs()));
        assert!(peak > 0.01, "note was silent");
        assert!(frames.iter().all(|(l, r)| l.abs() <= 1.0 && r.abs() <= 1.0));
        assert!(frames.iter().any(|(l, r)| l != r), "chorus should widen the image");
    }

    #[test]
    fn dry_mix_is_master_gain_times_voice_sum() {
        let config = EngineConfig::default();
        let mut engine = FmEngine::standalone(config).unwrap();
        engine.note_on(60, 261.63);

        let mut reference = crate::synth::voice::FmVoice::new(config.sample_rate);
        reference.note_on(261.63);

        for n in 0..1_000 {
            let (left, right) = engine.next_frame();
            let expected = (reference.process() * config.master_gain).tanh();
            assert_eq!(left, right);
            assert!((left - expected).abs() < 1e-6, "sample {n}: {left} vs {expected}");
        }
    }

    #[test]
    fn messages_are_applied_at_the_next_tick() {
        let (mut engine, mut handle) = FmEngine::new(EngineConfig::default()).unwrap();
        handle.note_on(60).unwrap();
        handle.note_on(64).unwrap();

        engine.next_frame();
        assert_eq!(engine.pool().held_notes(), 2);

        handle.note_off(60).unwrap();
        render(&mut engine, 63);
        assert_eq!(engine.pool().held_notes(), 2, "drained only on a tick");
        engine.next_frame();
        assert_eq!(engine.pool().held_notes(), 1);
        assert_eq!(handle.monitor().active_voices(), 2);
    }

    #[test]
    fn out_of_range_notes_are_rejected() {
        let (mut engine, mut handle) = FmEngine::new(EngineConfig::default()).unwrap();
        assert_eq!(handle.note_on(200), Err(SynthError::InvalidNote(200)));

        engine.next_frame();
        assert_eq!(engine.pool().held_notes(), 0);
        assert_eq!(engine.note_on(255, 440.0), Allocation::Ignored);
        assert_eq!(engine.router().mod_env_state(), crate::dsp::EnvelopeState::Idle);
        assert_eq!(handle.monitor().voice(0).map(|s| s.note), Some(None));
    }

    #[test]
    fn queue_full_is_reported() {
        let (_engine, mut handle) = FmEngine::new(EngineConfig::default()).unwrap();
        for _ in 0..MESSAGE_QUEUE_CAPACITY {
            handle.note_off(1).unwrap();
        }
        assert_eq!(handle.note_on(60), Err(SynthError::QueueFull));
    }

    #[test]
    fn parameters_reach_voices_on_tick() {
        let mut engine = FmEngine::standalone(EngineConfig::default()).unwrap();
        engine.params().set_algorithm(Algorithm::Triple);
        engine.params().ratio[3].set(6.0);
        engine.params().attack.set(0.5);

        engine.next_frame();
        let voice = engine.pool().voice(0).unwrap();
        assert_eq!(voice.algorithm(), Algorithm::Triple);
        assert_eq!(voice.ratios()[3], 6.0);
        assert_eq!(
            voice.envelope_level(),
            0.0,
            "no note yet, envelope untouched"
        );
        assert_eq!(engine.current_params().adsr.attack, 0.5);
    }

    #[test]
    fn lfo_modulation_is_visible_in_current_params() {
        let mut engine = FmEngine::standalone(EngineConfig::default()).unwrap();
        let params = Arc::clone(engine.params());
        params.reverb_mix.set(0.5);
        params.lfo[0].rate.set(10.0);
        params.lfo[0].depth.set(1.0);
        params.set_lfo_target(0, crate::modulation::ModTarget::ReverbMix);

        let mut seen = Vec::new();
        for _ in 0..100 {
            render(&mut engine, 64);
            seen.push(engine.current_params().reverb_mix);
        }
        assert!(seen.iter().all(|m| (0.0..=1.0).contains(m)));
        assert!(seen.iter().any(|&m| m > 0.9) && seen.iter().any(|&m| m < 0.1));
        assert_eq!(params.reverb_mix.get(), 0.5, "base value is never rewritten");
    }

    #[test]
    fn reverb_character_follows_params() {
        let mut engine = FmEngine::standalone(EngineConfig::default()).unwrap();
        for reverb in engine.reverbs() {
            assert_eq!(reverb.decay(), crate::dsp::reverb::DEFAULT_DECAY);
        }

        engine.params().reverb_decay.set(2.0);
        engine.params().reverb_damping.set(0.9);
        engine.next_frame();
        for reverb in engine.reverbs() {
            assert_eq!(reverb.decay(), 0.99, "decay stays below unity feedback");
            assert_eq!(reverb.damping(), 0.9);
        }
    }

    #[test]
    fn modulation_levels_are_published() {
        let mut engine = FmEngine::standalone(EngineConfig::default()).unwrap();
        let monitor = Arc::clone(engine.monitor());
        engine.params().lfo[1].rate.set(5.0);
        engine.params().lfo[1].depth.set(1.0);
        engine.params().mod_env.attack.set(0.001);
        engine.params().mod_env.decay.set(0.01);
        engine.params().mod_env.sustain.set(0.5);

        engine.note_on(60, 261.63);
        render(&mut engine, 64 * 200);

        let status = monitor.modulation();
        assert_eq!(status.lfo, engine.router().lfo_values());
        assert_eq!(status.mod_env, engine.router().mod_env_level());
        assert!(
            (status.mod_env - 0.5).abs() < 0.01,
            "mod env should sit at sustain, got {}",
            status.mod_env
        );

        let mut peak = 0.0f32;
        for _ in 0..100 {
            render(&mut engine, 64);
            peak = peak.max(monitor.modulation().lfo[1].abs());
        }
        assert!(peak > 0.5, "LFO 2 should swing, peak {peak}");
        assert_eq!(monitor.modulation().lfo[0], 0.0, "LFO 1 has no depth");
    }

    #[test]
    fn mod_envelope_follows_held_keys() {
        use crate::dsp::EnvelopeState;

        let mut engine = FmEngine::standalone(EngineConfig::default()).unwrap();
        engine.params().mod_env.sustain.set(0.5);

        engine.note_on(60, 261.63);
        engine.note_on(64, 329.63);
        render(&mut engine, 64 * 1_000);
        assert_eq!(engine.router().mod_env_state(), EnvelopeState::Sustain);

        engine.note_off(60);
        render(&mut engine, 64);
        assert_eq!(engine.router().mod_env_state(), EnvelopeState::Sustain);

        engine.note_off(64);
        render(&mut engine, 64);
        assert_eq!(engine.router().mod_env_state(), EnvelopeState::Release);
    }

    #[test]
    fn duplicate_note_on_changes_nothing() {
        let mut a = FmEngine::standalone(EngineConfig::default()).unwrap();
        let mut b = FmEngine::standalone(EngineConfig::default()).unwrap();
        for engine in [&mut a, &mut b] {
            engine.params().set_algorithm(Algorithm::Branch);
            engine.params().attack.set(0.2);
        }

        a.note_on(62, 293.66);
        b.note_on(62, 293.66);
        render(&mut a, 500);
        render(&mut b, 500);

        assert_eq!(b.note_on(62, 293.66), Allocation::Duplicate);
        assert_eq!(render(&mut a, 2_000), render(&mut b, 2_000));
    }

    #[test]
    fn interleaved_layouts() {
        let mut stereo = FmEngine::standalone(EngineConfig::default()).unwrap();
        let mut mono = FmEngine::standalone(EngineConfig::default()).unwrap();
        let mut quad = FmEngine::standalone(EngineConfig::default()).unwrap();
        for engine in [&mut stereo, &mut mono, &mut quad] {
            engine.params().chorus_mix.set(0.6);
            engine.note_on(57, 220.0);
        }

        let mut two = vec![0.0; 256];
        let mut one = vec![0.0; 128];
        let mut four = vec![1.0; 512];
        stereo.render_interleaved(&mut two, 2);
        mono.render_interleaved(&mut one, 1);
        quad.render_interleaved(&mut four, 4);

        for i in 0..128 {
            let (l, r) = (two[2 * i], two[2 * i + 1]);
            assert_eq!(one[i], (l + r) * 0.5);
            assert_eq!(&four[4 * i..4 * i + 4], &[l, r, 0.0, 0.0]);
        }
    }

    #[test]
    fn preset_loading() {
        let (_engine, handle) = FmEngine::new(EngineConfig::default()).unwrap();
        let preset = handle.load_preset("pad").unwrap();
        assert_eq!(preset.algorithm, Algorithm::DualCarrier);
        assert_eq!(handle.params().chorus_mix.get(), 0.4);
        assert!(matches!(
            handle.load_preset("nope"),
            Err(SynthError::UnknownPreset(_))
        ));
    }

    #[test]
    fn reset_silences_tails() {
        let mut engine = FmEngine::standalone(EngineConfig::default()).unwrap();
        engine.params().reverb_mix.set(1.0);
        engine.params().release.set(2.0);
        engine.note_on(48, 130.81);
        render(&mut engine, 4_000);
        engine.note_off(48);

        engine.reset();
        assert_eq!(engine.pool().active_voices(), 0);
        assert!(render(&mut engine, 512).iter().all(|&(l, r)| l == 0.0 && r == 0.0));
    }

    #[test]
    fn oldest_note_policy_from_config() {
        let config = EngineConfig::default()
            .with_polyphony(2)
            .with_steal_policy(StealPolicy::OldestNote);
        let mut engine = FmEngine::standalone(config).unwrap();
        engine.note_on(60, 261.63);
        engine.note_on(62, 293.66);
        engine.note_off(60);
        engine.note_on(60, 261.63); // reuses slot 0 (releasing)
        assert_eq!(
            engine.note_on(64, 329.63),
            Allocation::Stolen {
                index: 1,
                previous: 62
            }
        );
    }
}
