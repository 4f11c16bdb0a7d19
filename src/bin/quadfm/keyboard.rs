//! Computer keyboard as a piano.
//!
//! ```text
//!   W E   T Y U   O P
//!  A S D F G H J K L ;
//! ```
//!
//! Terminals report presses but not releases, so a key counts as held while
//! its auto-repeat keeps arriving and is released `HOLD` after the last one.

use std::time::{Duration, Instant};

const HOLD: Duration = Duration::from_millis(500);

const MIN_OCTAVE: i8 = 0;
const MAX_OCTAVE: i8 = 9;

/// Semitone offset from C of the current octave.
pub fn key_offset(key: char) -> Option<u8> {
    let offset = match key.to_ascii_lowercase() {
        'a' => 0,
        'w' => 1,
        's' => 2,
        'e' => 3,
        'd' => 4,
        'f' => 5,
        't' => 6,
        'g' => 7,
        'y' => 8,
        'h' => 9,
        'u' => 10,
        'j' => 11,
        'k' => 12,
        'o' => 13,
        'l' => 14,
        'p' => 15,
        ';' => 16,
        _ => return None,
    };
    Some(offset)
}

/// What a key press should do to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Start this note.
    Press(u8),
    /// Already sounding; only the hold timer was refreshed.
    Repeat,
}

pub struct Keyboard {
    octave: i8,
    held: Vec<(u8, Instant)>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            octave: 4,
            held: Vec::new(),
        }
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn shift_octave(&mut self, delta: i8) {
        self.octave = (self.octave + delta).clamp(MIN_OCTAVE, MAX_OCTAVE);
    }

    /// MIDI note for `key` in the current octave (C4 = 60).
    pub fn note_for(&self, key: char) -> Option<u8> {
        let base = (self.octave as i16 + 1) * 12;
        let note = base + key_offset(key)? as i16;
        u8::try_from(note).ok().filter(|n| *n < 128)
    }

    pub fn press(&mut self, note: u8, now: Instant) -> KeyAction {
        match self.held.iter_mut().find(|(held, _)| *held == note) {
            Some((_, last)) => {
                *last = now;
                KeyAction::Repeat
            }
            None => {
                self.held.push((note, now));
                KeyAction::Press(note)
            }
        }
    }

    /// Notes whose hold time ran out; they are forgotten here.
    pub fn expire(&mut self, now: Instant) -> Vec<u8> {
        let mut released = Vec::new();
        self.held.retain(|&(note, last)| {
            let keep = now.duration_since(last) < HOLD;
            if !keep {
                released.push(note);
            }
            keep
        });
        released
    }

    /// Forget every held note (the engine is told separately).
    pub fn clear(&mut self) {
        self.held.clear();
    }
}
