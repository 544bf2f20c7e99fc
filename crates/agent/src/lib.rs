//! Reply orchestration for the avatar chat service
//!
//! Features:
//! - Keyword-scored emotion classification of reply text
//! - Fixed-order provider fallback (primary, secondary, static reply)
//! - Best-effort speech synthesis attached to provider replies

pub mod emotion;
pub mod orchestrator;

pub use emotion::{classify, EmotionClassifier, KeywordTable};
pub use orchestrator::{
    FallbackReason, Orchestrated, ProviderAttempt, ProviderOutcome, ReplySource,
    ResponseOrchestrator,
};

use thiserror::Error;

/// Agent errors
///
/// Only raised while building the orchestrator; a running turn never fails.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<avatar_chat_llm::LlmError> for AgentError {
    fn from(err: avatar_chat_llm::LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}

impl From<avatar_chat_speech::SpeechError> for AgentError {
    fn from(err: avatar_chat_speech::SpeechError) -> Self {
        AgentError::Speech(err.to_string())
    }
}
