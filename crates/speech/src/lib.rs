//! Speech synthesis for chat replies
//!
//! `OpenAiTts` implements [`TextToSpeech`](avatar_chat_core::TextToSpeech)
//! against the OpenAI audio speech API. `SpeechSynthesizer` wraps an optional
//! engine with a bounded wait and base64 encoding; it never fails a reply.

pub mod openai;
pub mod synthesizer;

pub use openai::{OpenAiTts, OpenAiTtsConfig};
pub use synthesizer::{SpeechSynthesizer, Synthesis};

use thiserror::Error;

/// Speech errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no audio")]
    EmptyAudio,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        SpeechError::Network(err.to_string())
    }
}

impl From<SpeechError> for avatar_chat_core::Error {
    fn from(err: SpeechError) -> Self {
        avatar_chat_core::Error::Tts(err.to_string())
    }
}
