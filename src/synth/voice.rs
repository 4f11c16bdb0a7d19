use crate::dsp::envelope::{Adsr, Envelope, EnvelopeState};
use crate::dsp::oscillator::Oscillator;
use crate::synth::algorithm::Algorithm;

/*
FM Voice
========

One playable note: four operators, one amplitude envelope, and an
algorithm that wires the operators together.

Per Sample
----------

    1. feedback = index1 · previous op1 output
    2. env      = envelope.next_sample()
    3. evaluate the algorithm (see `algorithm.rs`)
    4. remember op1's output for step 1 of the next sample
    5. out      = mix · amplitude · env · algorithm gain

Lifecycle
---------

  note_on(freq)   every operator gets freq × its ratio, phases and the
                  feedback memory are zeroed, the envelope enters Attack
  note_off()      the envelope enters Release; operators keep running so
                  the tail sounds
  (envelope idle) the voice is silent and `process` returns 0 immediately

There is no separate "playing" flag: a voice is active exactly when its
envelope is not Idle.
*/

pub const DEFAULT_RATIOS: [f32; 4] = [1.0, 2.0, 3.0, 4.0];
pub const DEFAULT_INDICES: [f32; 4] = [0.0, 2.0, 1.5, 1.0];
pub const DEFAULT_AMPLITUDE: f32 = 0.3;

pub struct FmVoice {
    operators: [Oscillator; 4],
    envelope: Envelope,
    ratios: [f32; 4],
    indices: [f32; 4],
    algorithm: Algorithm,
    feedback: f32, // previous op1 output
    amplitude: f32,
    frequency: f32, // note frequency, before ratios
}

impl FmVoice {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_amplitude(sample_rate, DEFAULT_AMPLITUDE)
    }

    pub fn with_amplitude(sample_rate: f32, amplitude: f32) -> Self {
        let frequency = 440.0;
        Self {
            operators: DEFAULT_RATIOS.map(|r| Oscillator::new(frequency * r, sample_rate)),
            envelope: Envelope::new(sample_rate),
            ratios: DEFAULT_RATIOS,
            indices: DEFAULT_INDICES,
            algorithm: Algorithm::Stack,
            feedback: 0.0,
            amplitude: amplitude.max(0.0),
            frequency,
        }
    }

    pub fn note_on(&mut self, frequency: f32) {
        self.frequency = frequency;
        for (op, ratio) in self.operators.iter_mut().zip(self.ratios) {
            op.set_frequency(frequency * ratio);
            op.reset();
        }
        self.feedback = 0.0;
        self.envelope.note_on();
    }

    pub fn note_off(&mut self) {
        self.envelope.note_off();
    }

    #[inline]
    pub fn process(&mut self) -> f32 {
        if !self.envelope.is_active() {
            return 0.0;
        }

        let feedback = self.indices[0] * self.feedback;
        let env_level = self.envelope.next_sample();

        let out = self
            .algorithm
            .render(&mut self.operators, &self.indices, feedback);
        self.feedback = out.op1;

        out.mix * self.amplitude * env_level * self.algorithm.output_gain()
    }

    /// Add this voice's output into `buffer`.
    pub fn render_add(&mut self, buffer: &mut [f32]) {
        if !self.is_active() {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample += self.process();
        }
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Silence immediately, skipping the release tail.
    pub fn reset(&mut self) {
        self.envelope.reset();
        self.feedback = 0.0;
        for op in &mut self.operators {
            op.reset();
        }
    }

    /// Change an operator ratio. A sounding voice re-derives that
    /// operator's frequency immediately; phase is kept.
    pub fn set_ratio(&mut self, operator: usize, ratio: f32) {
        let Some(slot) = self.ratios.get_mut(operator) else {
            return;
        };
        if *slot == ratio {
            return;
        }
        *slot = ratio;
        if self.is_active() {
            self.operators[operator].set_frequency(self.frequency * ratio);
        }
    }

    pub fn set_ratios(&mut self, ratios: [f32; 4]) {
        for (operator, ratio) in ratios.into_iter().enumerate() {
            self.set_ratio(operator, ratio);
        }
    }

    pub fn set_index(&mut self, operator: usize, index: f32) {
        if let Some(slot) = self.indices.get_mut(operator) {
            *slot = index;
        }
    }

    pub fn set_indices(&mut self, indices: [f32; 4]) {
        self.indices = indices;
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    pub fn set_adsr(&mut self, adsr: Adsr) {
        self.envelope.set_adsr(adsr);
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude.max(0.0);
    }

    pub fn ratios(&self) -> [f32; 4] {
        self.ratios
    }

    pub fn indices(&self) -> [f32; 4] {
        self.indices
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn operator_frequency(&self, operator: usize) -> Option<f32> {
        self.operators.get(operator).map(Oscillator::frequency)
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn envelope_state(&self) -> EnvelopeState {
        self.envelope.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44_100.0;

    #[test]
    fn idle_voice_is_silent() {
        let mut voice = FmVoice::new(SAMPLE_RATE);
        assert!(!voice.is_active());
        for _ in 0..100 {
            assert_eq!(voice.process(), 0.0);
        }
    }

    #[test]
    fn zero_index_stack_matches_bare_oscillator() {
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.set_algorithm(Algorithm::Stack);
        voice.set_ratios([1.0; 4]);
        voice.set_indices([0.0; 4]);
        voice.note_on(440.0);

        let mut osc = Oscillator::new(440.0, SAMPLE_RATE);
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_on();

        for n in 0..4_000 {
            let level = env.next_sample();
            let expected = osc.process(0.0) * DEFAULT_AMPLITUDE * level;
            assert_eq!(voice.process(), expected, "sample {n}");
        }
    }

    #[test]
    fn note_on_sets_operator_frequencies_from_ratios() {
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.set_ratios([1.0, 0.5, 3.0, 7.0]);
        voice.note_on(200.0);

        let freqs: Vec<f32> = (0..4).filter_map(|i| voice.operator_frequency(i)).collect();
        assert_eq!(freqs, [200.0, 100.0, 600.0, 1400.0]);
    }

    #[test]
    fn retrigger_produces_repeatable_onset() {
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.set_algorithm(Algorithm::Branch);
        voice.set_indices([0.8, 2.0, 1.5, 1.0]);

        voice.note_on(330.0);
        let first: Vec<f32> = (0..64).map(|_| voice.process()).collect();

        // Let it run, then force silence so the envelope restarts from zero
        for _ in 0..1_000 {
            voice.process();
        }
        voice.reset();
        voice.note_on(330.0);
        let second: Vec<f32> = (0..64).map(|_| voice.process()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn note_off_lets_tail_ring_then_goes_idle() {
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.set_adsr(Adsr {
            attack: 0.001,
            decay: 0.01,
            sustain: 0.5,
            release: 0.01,
        });
        voice.note_on(440.0);
        for _ in 0..1_000 {
            voice.process();
        }

        voice.note_off();
        assert!(voice.is_active(), "release tail should keep the voice active");
        assert_eq!(voice.envelope_state(), EnvelopeState::Release);

        let tail: f32 = (0..200).map(|_| voice.process().abs()).sum();
        assert!(tail > 0.0, "release tail was silent");

        for _ in 0..1_000 {
            voice.process();
        }
        assert!(!voice.is_active());
        assert_eq!(voice.process(), 0.0);
    }

    #[test]
    fn ratio_change_retunes_sounding_voice_only() {
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.set_ratio(1, 5.0);
        // Not sounding: operator keeps its old frequency until note_on
        assert_eq!(voice.operator_frequency(1), Some(880.0));

        voice.note_on(100.0);
        assert_eq!(voice.operator_frequency(1), Some(500.0));

        voice.set_ratio(1, 2.5);
        assert_eq!(voice.operator_frequency(1), Some(250.0));

        // Out of range operator is ignored
        voice.set_ratio(9, 1.0);
        assert_eq!(voice.ratios(), [1.0, 2.5, 3.0, 4.0]);
    }

    #[test]
    fn dual_carrier_respects_attenuation_bound() {
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.set_algorithm(Algorithm::DualCarrier);
        voice.set_indices([1.0, 8.0, 4.0, 10.0]);
        voice.set_ratios([1.0, 1.0, 1.0, 1.0]);
        voice.note_on(261.6);

        let bound = (1.0 + 0.7) * DEFAULT_AMPLITUDE * 0.7;
        for n in 0..10_000 {
            let level = voice.envelope_level();
            let out = voice.process();
            // Envelope level used for this sample is the one after advancing
            let env = voice.envelope_level().max(level);
            assert!(
                out.abs() <= bound * env + 1e-6,
                "sample {n}: {out} exceeds {}",
                bound * env
            );
        }
    }

    #[test]
    fn feedback_alters_output() {
        let mut dry = FmVoice::new(SAMPLE_RATE);
        let mut fed = FmVoice::new(SAMPLE_RATE);
        dry.set_indices([0.0; 4]);
        fed.set_indices([1.5, 0.0, 0.0, 0.0]);
        dry.note_on(440.0);
        fed.note_on(440.0);

        let difference: f32 = (0..512).map(|_| (dry.process() - fed.process()).abs()).sum();
        assert!(difference > 1.0, "feedback had no effect: {difference}");
    }
}
