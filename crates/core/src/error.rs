//! Error types shared across crates

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias using the core error
pub type Result<T> = std::result::Result<T, Error>;
