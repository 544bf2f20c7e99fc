//! Core traits and types for the avatar chat service
//!
//! This crate provides foundational types used across all other crates:
//! - Emotion vocabulary shared with the rendering layer
//! - The chat reply returned to clients
//! - Completion request types for LLM providers
//! - Speech synthesis trait and voice configuration
//! - Error types

pub mod emotion;
pub mod error;
pub mod llm_types;
pub mod reply;
pub mod traits;
pub mod voice_config;

pub use emotion::EmotionTag;
pub use error::{Error, Result};
pub use llm_types::{CompletionOptions, CompletionRequest, ProviderKind};
pub use reply::ChatReply;
pub use traits::TextToSpeech;
pub use voice_config::{AudioClip, AudioFormat, VoiceConfig};
