use thiserror::Error;

/// Errors surfaced on the control side. The render path never fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthError {
    #[error("note message queue is full")]
    QueueFull,

    #[error("note number {0} is outside the MIDI range 0..=127")]
    InvalidNote(u8),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("invalid engine config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, SynthError>;
