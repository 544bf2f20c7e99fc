//! Core traits for the avatar chat service
//!
//! Speech synthesis is pluggable so the orchestrator can run against a real
//! provider in production and a mock in tests. LLM backends live behind their
//! own trait in the llm crate.

mod speech;

pub use speech::TextToSpeech;
