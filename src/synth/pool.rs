use crate::synth::voice::FmVoice;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Voice Pool
==========

A fixed array of FM voices plus the bookkeeping that maps held MIDI notes
onto them. Nothing is allocated after construction.

Two Kinds of "Free"
-------------------

A slot's note tag is cleared the moment its key is released, but the voice
keeps sounding through its release tail. So a slot can be:

  truly free   no note tag, envelope Idle         (best choice)
  releasing    no note tag, envelope still active (acceptable)
  held         tagged with a note                 (only by stealing)

note_on searches in that order. When every slot is held, a voice is stolen:

  FirstSlot    always slot 0, whatever it is playing
  OldestNote   the slot whose note started longest ago

Invariants
----------

  - a note number is tagged on at most one slot
  - a slot carries at most one note tag
  - a second note_on for a held note changes nothing
*/

/// Highest MIDI note number a slot can be tagged with.
pub const MAX_NOTE: u8 = 127;

/// Which held voice gives way when every slot is taken.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StealPolicy {
    #[default]
    FirstSlot,
    OldestNote,
}

/// How `VoicePool::note_on` placed a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// Note already held; nothing happened.
    Duplicate,
    /// Note number above `MAX_NOTE`; nothing happened.
    Ignored,
    /// Slot was idle and untagged.
    Free(usize),
    /// Slot was untagged but still in its release tail.
    Releasing(usize),
    /// Every slot was held; `previous` was cut off.
    Stolen { index: usize, previous: u8 },
}

impl Allocation {
    pub fn index(self) -> Option<usize> {
        match self {
            Allocation::Duplicate | Allocation::Ignored => None,
            Allocation::Free(index) | Allocation::Releasing(index) => Some(index),
            Allocation::Stolen { index, .. } => Some(index),
        }
    }
}

struct Slot {
    voice: FmVoice,
    note: Option<u8>,
    age: u64, // note_on sequence number
}

pub struct VoicePool {
    slots: Box<[Slot]>,
    policy: StealPolicy,
    next_age: u64,
}

impl VoicePool {
    pub fn new(sample_rate: f32, polyphony: usize, amplitude: f32) -> Self {
        let slots = (0..polyphony.max(1))
            .map(|_| Slot {
                voice: FmVoice::with_amplitude(sample_rate, amplitude),
                note: None,
                age: 0,
            })
            .collect();

        Self {
            slots,
            policy: StealPolicy::default(),
            next_age: 0,
        }
    }

    pub fn with_policy(mut self, policy: StealPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: StealPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> StealPolicy {
        self.policy
    }

    pub fn polyphony(&self) -> usize {
        self.slots.len()
    }

    pub fn note_on(&mut self, note: u8, frequency: f32) -> Allocation {
        if note > MAX_NOTE {
            return Allocation::Ignored;
        }
        if self.find_note(note).is_some() {
            return Allocation::Duplicate;
        }

        let allocation = self.allocate();
        let index = match allocation {
            Allocation::Free(index) | Allocation::Releasing(index) => index,
            Allocation::Stolen { index, .. } => index,
            Allocation::Duplicate | Allocation::Ignored => return allocation,
        };

        let slot = &mut self.slots[index];
        slot.note = Some(note);
        slot.age = self.next_age;
        slot.voice.note_on(frequency);
        self.next_age += 1;

        allocation
    }

    /// Release the voice holding `note` and untag it. Returns the slot index.
    pub fn note_off(&mut self, note: u8) -> Option<usize> {
        let index = self.find_note(note)?;
        let slot = &mut self.slots[index];
        slot.voice.note_off();
        slot.note = None;
        Some(index)
    }

    /// Release every held note.
    pub fn all_notes_off(&mut self) {
        for slot in self.slots.iter_mut() {
            if slot.note.take().is_some() {
                slot.voice.note_off();
            }
        }
    }

    /// Sum of every voice's next sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        self.slots.iter_mut().map(|slot| slot.voice.process()).sum()
    }

    pub fn held_notes(&self) -> usize {
        self.slots.iter().filter(|slot| slot.note.is_some()).count()
    }

    pub fn active_voices(&self) -> usize {
        self.slots.iter().filter(|slot| slot.voice.is_active()).count()
    }

    pub fn note_at(&self, index: usize) -> Option<u8> {
        self.slots.get(index).and_then(|slot| slot.note)
    }

    pub fn voice(&self, index: usize) -> Option<&FmVoice> {
        self.slots.get(index).map(|slot| &slot.voice)
    }

    pub fn voices(&self) -> impl Iterator<Item = &FmVoice> {
        self.slots.iter().map(|slot| &slot.voice)
    }

    pub fn voices_mut(&mut self) -> impl Iterator<Item = &mut FmVoice> {
        self.slots.iter_mut().map(|slot| &mut slot.voice)
    }

    /// Silence everything and forget all notes.
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.voice.reset();
            slot.note = None;
            slot.age = 0;
        }
        self.next_age = 0;
    }

    fn find_note(&self, note: u8) -> Option<usize> {
        self.slots.iter().position(|slot| slot.note == Some(note))
    }

    fn allocate(&self) -> Allocation {
        if let Some(index) = self
            .slots
            .iter()
            .position(|slot| slot.note.is_none() && !slot.voice.is_active())
        {
            return Allocation::Free(index);
        }

        if let Some(index) = self.slots.iter().position(|slot| slot.note.is_none()) {
            return Allocation::Releasing(index);
        }

        let index = match self.policy {
            StealPolicy::FirstSlot => 0,
            StealPolicy::OldestNote => self
                .slots
                .iter()
                .enumerate()
                .min_by_key(|(_, slot)| slot.age)
                .map(|(index, _)| index)
                .unwrap_or(0),
        };

        match self.slots[index].note {
            Some(previous) => Allocation::Stolen { index, previous },
            // Unreachable: every slot is tagged at this point
            None => Allocation::Free(index),
        }
    }
}
