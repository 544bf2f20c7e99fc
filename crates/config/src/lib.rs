//! Configuration management for the avatar chat service
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (AVATAR_CHAT_ prefix, `__` between sections)
//! - Provider credentials from OPENAI_API_KEY / ANTHROPIC_API_KEY
//!
//! Settings are read once at start-up and are immutable afterwards.

pub mod constants;
pub mod persona;
pub mod settings;

pub use persona::{PersonaConfig, PersonaLanguage};
pub use settings::{
    load_settings, load_settings_from, AnthropicSettings, ApiKey, ObservabilityConfig, OpenAiSettings,
    ProvidersConfig, RuntimeEnvironment, ServerConfig, Settings, SpeechConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
