//! Audio I/O
//!
//! WAV reading with downmix to mono, and mono 16-bit PCM writing.

pub mod wav;

pub use wav::AudioBuffer;
