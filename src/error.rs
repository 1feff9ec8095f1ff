//! Error types

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum ChanStressError {
    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Unknown preset '{0}'. Use: none|voip|pstn|lowbit")]
    UnknownPreset(String),

    #[error("Unknown noise type '{0}'. Use: awgn|pink|hum|clicks|mix")]
    UnknownNoise(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Harness error: {message}")]
    Harness { message: String },
}

impl ChanStressError {
    pub fn audio<S: Into<String>>(msg: S) -> Self {
        Self::Audio { message: msg.into() }
    }

    pub fn harness<S: Into<String>>(msg: S) -> Self {
        Self::Harness { message: msg.into() }
    }
}

pub type Result<T> = std::result::Result<T, ChanStressError>;
