// Purpose: FM voices, operator routing and polyphony
// This layer sits above the dsp primitives and below the engine

pub mod algorithm;
pub mod message;
pub mod pool;
pub mod voice;

pub use algorithm::Algorithm;
pub use message::{MessageReceiver, SynthMessage};
pub use pool::{Allocation, StealPolicy, VoicePool};
pub use voice::FmVoice;
