use crate::dsp::oscillator::Oscillator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
FM Algorithms
=============

An algorithm is the wiring between the four operators of a voice: who
modulates whom, and who is heard. Operators are numbered 1..4 and op1 is
always a carrier. Arrows read "modulates".

  Stack            Twin              Branch            Parallel
  -----            ----              ------            --------
   4                4                   4               2  3  4
   │                │                  ╱ ╲               ╲ │ ╱
   3                3   2             3   2               ╲│╱
   │                 ╲ ╱               ╲ ╱                 1
   2                  1                 1
   │
   1

  Dual             Triple
  ----             ------
   4   2              4
   │   │            ╱ │ ╲
   3   1           1  2  3
  (3 and 1         (all three
   both heard)      heard)


Modulation Depth
----------------

A modulator's output (in [-1, 1]) is multiplied by an index before being
added to the target's phase. The index of the *source* operator sets the
depth, except on the op1 input where each modulator uses its own index:

    Stack:     op3 ← index4·op4,  op2 ← index3·op3,  op1 ← index2·op2
    Branch:    op3 ← index4·op4,  op2 ← index4·op4
    Triple:    op1, op2, op3 ← index4·op4

op1 additionally receives its own previous output scaled by index1. That is
the self-feedback path; it is added on every algorithm.


Output Level
------------

Algorithms with several carriers sum louder than one, so they carry fixed
blend weights and a final attenuation:

    Dual:    (op1 + 0.7·op3) · 0.7
    Triple:  (op1 + 0.6·op2 + 0.4·op3) · 0.5

`render` returns the blended mix; `output_gain` is applied by the voice
together with the envelope and amplitude.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Stack,
    Twin,
    Branch,
    Parallel,
    DualCarrier,
    Triple,
}

/// Result of one algorithm evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorOutput {
    /// op1's sample, fed back into op1 on the next sample.
    pub op1: f32,
    /// Carrier blend before `output_gain`.
    pub mix: f32,
}

impl Algorithm {
    pub const COUNT: usize = 6;

    pub const ALL: [Algorithm; Self::COUNT] = [
        Algorithm::Stack,
        Algorithm::Twin,
        Algorithm::Branch,
        Algorithm::Parallel,
        Algorithm::DualCarrier,
        Algorithm::Triple,
    ];

    /// Out-of-range indices fall back to `Stack`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Stack => "Stack",
            Algorithm::Twin => "Twin",
            Algorithm::Branch => "Branch",
            Algorithm::Parallel => "Parallel",
            Algorithm::DualCarrier => "Dual",
            Algorithm::Triple => "Triple",
        }
    }

    /// Fixed attenuation applied after the carrier blend.
    #[inline]
    pub fn output_gain(self) -> f32 {
        match self {
            Algorithm::DualCarrier => 0.7,
            Algorithm::Triple => 0.5,
            _ => 1.0,
        }
    }

    /// Advance all four operators by one sample.
    ///
    /// `index[0]` is only used through `feedback`, which the caller computes
    /// as `index1 · previous op1`.
    #[inline]
    pub fn render(self, ops: &mut [Oscillator; 4], index: &[f32; 4], feedback: f32) -> OperatorOutput {
        let [op1, op2, op3, op4] = ops;
        let [_, index2, index3, index4] = *index;

        match self {
            Algorithm::Stack => {
                let out4 = op4.process(0.0);
                let out3 = op3.process(index4 * out4);
                let out2 = op2.process(index3 * out3);
                let out1 = op1.process(index2 * out2 + feedback);
                OperatorOutput { op1: out1, mix: out1 }
            }

            Algorithm::Twin => {
                let out4 = op4.process(0.0);
                let out3 = op3.process(index4 * out4);
                let out2 = op2.process(0.0);
                let out1 = op1.process(index3 * out3 + index2 * out2 + feedback);
                OperatorOutput { op1: out1, mix: out1 }
            }

            Algorithm::Branch => {
                let out4 = op4.process(0.0);
                let out3 = op3.process(index4 * out4);
                let out2 = op2.process(index4 * out4);
                let out1 = op1.process(index3 * out3 + index2 * out2 + feedback);
                OperatorOutput { op1: out1, mix: out1 }
            }

            Algorithm::Parallel => {
                let out2 = op2.process(0.0);
                let out3 = op3.process(0.0);
                let out4 = op4.process(0.0);
                let out1 = op1.process(index2 * out2 + index3 * out3 + index4 * out4 + feedback);
                OperatorOutput { op1: out1, mix: out1 }
            }

            Algorithm::DualCarrier => {
                let out4 = op4.process(0.0);
                let out3 = op3.process(index4 * out4);
                let out2 = op2.process(0.0);
                let out1 = op1.process(index2 * out2 + feedback);
                OperatorOutput {
                    op1: out1,
                    mix: out1 + out3 * 0.7,
                }
            }

            Algorithm::Triple => {
                let out4 = op4.process(0.0);
                let modulation = index4 * out4;
                let out1 = op1.process(modulation + feedback);
                let out2 = op2.process(modulation);
                let out3 = op3.process(modulation);
                OperatorOutput {
                    op1: out1,
                    mix: out1 + out2 * 0.6 + out3 * 0.4,
                }
            }
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
