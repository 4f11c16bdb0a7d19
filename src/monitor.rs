//! Observation surface for displays.
//!
//! The audio thread writes, any other thread reads, nobody waits. Readers get
//! "roughly the latest" data: a scope copy may straddle a write and mix two
//! adjacent blocks, which is fine for drawing a waveform and nothing else
//! should depend on it.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use atomic_float::AtomicF32;

const NO_NOTE: u8 = u8::MAX;

/// Fixed-size ring of recent mono samples.
pub struct ScopeBuffer {
    samples: Box<[AtomicF32]>,
    write_pos: AtomicUsize,
}

impl ScopeBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            samples: (0..size.max(1)).map(|_| AtomicF32::new(0.0)).collect(),
            write_pos: AtomicUsize::new(0),
        }
    }

    /// Number of samples the ring holds (at least one).
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Audio thread only.
    #[inline]
    pub fn push(&self, sample: f32) {
        let pos = self.write_pos.load(Ordering::Relaxed);
        self.samples[pos].store(sample, Ordering::Relaxed);
        self.write_pos
            .store((pos + 1) % self.samples.len(), Ordering::Release);
    }

    /// Copy the ring oldest-first into `out` (up to `capacity()` samples; the
    /// newest ones if `out` is shorter). Returns the count written.
    pub fn copy_into(&self, out: &mut [f32]) -> usize {
        let len = self.samples.len();
        let count = out.len().min(len);
        let end = self.write_pos.load(Ordering::Acquire);
        let start = (end + len - count) % len;

        for (i, slot) in out[..count].iter_mut().enumerate() {
            *slot = self.samples[(start + i) % len].load(Ordering::Relaxed);
        }
        count
    }

    /// Allocating convenience over `copy_into`.
    pub fn snapshot(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.samples.len()];
        self.copy_into(&mut out);
        out
    }

    pub fn clear(&self) {
        for sample in self.samples.iter() {
            sample.store(0.0, Ordering::Relaxed);
        }
        self.write_pos.store(0, Ordering::Release);
    }
}

/// What one voice slot is doing, as last published by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceStatus {
    pub active: bool,
    pub note: Option<u8>,
    pub level: f32,
}

/// Modulation sources after the latest control tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModulationStatus {
    /// Bipolar LFO outputs, already scaled by depth.
    pub lfo: [f32; 2],
    pub mod_env: f32,
}

struct VoiceCell {
    active: AtomicBool,
    note: AtomicU8,
    level: AtomicF32,
}

/// Engine state published once per control tick.
pub struct Monitor {
    scope: ScopeBuffer,
    voices: Box<[VoiceCell]>,
    lfo: [AtomicF32; 2],
    mod_env: AtomicF32,
}

impl Monitor {
    pub fn new(scope_size: usize, polyphony: usize) -> Self {
        Self {
            scope: ScopeBuffer::new(scope_size),
            voices: (0..polyphony)
                .map(|_| VoiceCell {
                    active: AtomicBool::new(false),
                    note: AtomicU8::new(NO_NOTE),
                    level: AtomicF32::new(0.0),
                })
                .collect(),
            lfo: [AtomicF32::new(0.0), AtomicF32::new(0.0)],
            mod_env: AtomicF32::new(0.0),
        }
    }

    pub fn scope(&self) -> &ScopeBuffer {
        &self.scope
    }

    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    pub(crate) fn publish_voice(&self, index: usize, status: VoiceStatus) {
        if let Some(cell) = self.voices.get(index) {
            cell.active.store(status.active, Ordering::Relaxed);
            cell.note
                .store(status.note.unwrap_or(NO_NOTE), Ordering::Relaxed);
            cell.level.store(status.level, Ordering::Relaxed);
        }
    }

    pub(crate) fn publish_modulation(&self, status: ModulationStatus) {
        for (cell, value) in self.lfo.iter().zip(status.lfo) {
            cell.store(value, Ordering::Relaxed);
        }
        self.mod_env.store(status.mod_env, Ordering::Relaxed);
    }

    pub fn modulation(&self) -> ModulationStatus {
        ModulationStatus {
            lfo: [
                self.lfo[0].load(Ordering::Relaxed),
                self.lfo[1].load(Ordering::Relaxed),
            ],
            mod_env: self.mod_env.load(Ordering::Relaxed),
        }
    }

    pub fn voice(&self, index: usize) -> Option<VoiceStatus> {
        self.voices.get(index).map(|cell| {
            let note = cell.note.load(Ordering::Relaxed);
            VoiceStatus {
                active: cell.active.load(Ordering::Relaxed),
                note: (note != NO_NOTE).then_some(note),
                level: cell.level.load(Ordering::Relaxed),
            }
        })
    }

    pub fn voices(&self) -> impl Iterator<Item = VoiceStatus> + '_ {
        (0..self.voices.len()).filter_map(|i| self.voice(i))
    }

    pub fn active_voices(&self) -> usize {
        self.voices().filter(|status| status.active).count()
    }
}
