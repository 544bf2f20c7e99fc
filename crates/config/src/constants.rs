//! Centralized constants for the avatar chat service
//!
//! Single source of truth for default endpoints, models and timeouts. Settings
//! defaults and backend defaults both read from here.

/// Service endpoints
pub mod endpoints {
    /// OpenAI API endpoint (chat completions and audio speech)
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// Anthropic API endpoint
    pub const ANTHROPIC_DEFAULT: &str = "https://api.anthropic.com";

    /// Anthropic API version header value
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
}

/// Environment variables holding provider credentials
pub mod credentials {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
}

/// Generation defaults
pub mod models {
    /// Primary provider model
    pub const OPENAI_CHAT: &str = "gpt-3.5-turbo";

    /// Secondary provider model
    pub const ANTHROPIC_CHAT: &str = "claude-3-haiku-20240307";

    /// Maximum tokens per reply (replies are kept to 2-3 sentences)
    pub const MAX_TOKENS: usize = 200;

    /// OpenAI sampling temperature
    pub const OPENAI_TEMPERATURE: f32 = 0.8;

    /// TTS model
    pub const TTS: &str = "tts-1";

    /// TTS voice
    pub const TTS_VOICE: &str = "echo";
}

/// Timeouts (in seconds)
pub mod timeouts {
    /// Bounded wait for one provider completion
    pub const LLM_CALL_SECS: u64 = 30;

    /// Bounded wait for one speech synthesis
    pub const TTS_CALL_SECS: u64 = 20;
}
