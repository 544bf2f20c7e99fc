//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use avatar_chat_core::AudioFormat;

use crate::constants::{credentials, endpoints, models, timeouts};
use crate::{ConfigError, PersonaConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode; CORS may be disabled (permissive)
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    /// Production requires explicit CORS origins
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Provider credential
///
/// Never printed: `Debug` and `Serialize` both redact the value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for request headers only
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("****")
    }
}

fn api_key_from_env(var: &str) -> Option<ApiKey> {
    std::env::var(var)
        .ok()
        .map(ApiKey::new)
        .filter(|key| !key.is_blank())
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Speech synthesis configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Persona prompt and static replies
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_providers()?;
        self.validate_speech()?;
        self.validate_persona()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port must be non-zero".to_string(),
            });
        }

        // Production never runs with permissive CORS
        if self.environment.is_production() {
            if !self.server.cors_enabled {
                return Err(ConfigError::InvalidValue {
                    field: "server.cors_enabled".to_string(),
                    message: "CORS must be enabled in production".to_string(),
                });
            }
            if self.server.cors_origins.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "server.cors_origins".to_string(),
                    message: "At least one origin is required in production".to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_providers(&self) -> Result<(), ConfigError> {
        let providers = &self.providers;

        if providers.call_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "providers.call_timeout_secs".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if providers.openai.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "providers.openai.max_tokens".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if providers.anthropic.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "providers.anthropic.max_tokens".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if let Some(t) = providers.openai.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::InvalidValue {
                    field: "providers.openai.temperature".to_string(),
                    message: format!("Must be between 0.0 and 2.0, got {}", t),
                });
            }
        }

        if let Some(t) = providers.anthropic.temperature {
            if !(0.0..=1.0).contains(&t) {
                return Err(ConfigError::InvalidValue {
                    field: "providers.anthropic.temperature".to_string(),
                    message: format!("Must be between 0.0 and 1.0, got {}", t),
                });
            }
        }

        Ok(())
    }

    fn validate_speech(&self) -> Result<(), ConfigError> {
        let speech = &self.speech;

        if !(0.25..=4.0).contains(&speech.speed) {
            return Err(ConfigError::InvalidValue {
                field: "speech.speed".to_string(),
                message: format!("Must be between 0.25 and 4.0, got {}", speech.speed),
            });
        }

        if speech.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "speech.timeout_secs".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_persona(&self) -> Result<(), ConfigError> {
        if self.persona.system_prompt.trim().is_empty() {
            return Err(ConfigError::MissingField("persona.system_prompt".to_string()));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// LLM providers, in fixed priority order: OpenAI first, Anthropic second
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Bounded wait for a single provider call
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Primary provider
    #[serde(default)]
    pub openai: OpenAiSettings,

    /// Secondary provider
    #[serde(default)]
    pub anthropic: AnthropicSettings,
}

fn default_call_timeout() -> u64 {
    timeouts::LLM_CALL_SECS
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout(),
            openai: OpenAiSettings::default(),
            anthropic: AnthropicSettings::default(),
        }
    }
}

impl ProvidersConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// OpenAI chat completions settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    /// API key; defaults to OPENAI_API_KEY
    #[serde(default = "default_openai_api_key")]
    pub api_key: Option<ApiKey>,

    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Temperature (0-2)
    #[serde(default = "default_openai_temperature")]
    pub temperature: Option<f32>,

    /// Organization ID
    #[serde(default)]
    pub organization: Option<String>,
}

fn default_openai_api_key() -> Option<ApiKey> {
    api_key_from_env(credentials::OPENAI_API_KEY)
}
fn default_openai_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}
fn default_openai_model() -> String {
    models::OPENAI_CHAT.to_string()
}
fn default_max_tokens() -> usize {
    models::MAX_TOKENS
}
fn default_openai_temperature() -> Option<f32> {
    Some(models::OPENAI_TEMPERATURE)
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: default_openai_api_key(),
            endpoint: default_openai_endpoint(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
            temperature: default_openai_temperature(),
            organization: None,
        }
    }
}

impl OpenAiSettings {
    /// Credential, if present and non-blank
    pub fn credential(&self) -> Option<&ApiKey> {
        self.api_key.as_ref().filter(|key| !key.is_blank())
    }
}

/// Anthropic messages settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicSettings {
    /// API key; defaults to ANTHROPIC_API_KEY
    #[serde(default = "default_anthropic_api_key")]
    pub api_key: Option<ApiKey>,

    #[serde(default = "default_anthropic_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_anthropic_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Temperature (0-1); provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_anthropic_api_key() -> Option<ApiKey> {
    api_key_from_env(credentials::ANTHROPIC_API_KEY)
}
fn default_anthropic_endpoint() -> String {
    endpoints::ANTHROPIC_DEFAULT.to_string()
}
fn default_anthropic_model() -> String {
    models::ANTHROPIC_CHAT.to_string()
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            api_key: default_anthropic_api_key(),
            endpoint: default_anthropic_endpoint(),
            model: default_anthropic_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

impl AnthropicSettings {
    /// Credential, if present and non-blank
    pub fn credential(&self) -> Option<&ApiKey> {
        self.api_key.as_ref().filter(|key| !key.is_blank())
    }
}

/// Speech synthesis settings (OpenAI audio speech API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Synthesis can be switched off while keeping the credential
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key; shares OPENAI_API_KEY by default
    #[serde(default = "default_openai_api_key")]
    pub api_key: Option<ApiKey>,

    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_tts_model")]
    pub model: String,

    #[serde(default = "default_tts_voice")]
    pub voice: String,

    /// Speech speed (0.25 - 4.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    #[serde(default)]
    pub response_format: AudioFormat,

    /// Bounded wait for a single synthesis
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_model() -> String {
    models::TTS.to_string()
}
fn default_tts_voice() -> String {
    models::TTS_VOICE.to_string()
}
fn default_speed() -> f32 {
    1.0
}
fn default_tts_timeout() -> u64 {
    timeouts::TTS_CALL_SECS
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: default_openai_api_key(),
            endpoint: default_openai_endpoint(),
            model: default_tts_model(),
            voice: default_tts_voice(),
            speed: default_speed(),
            response_format: AudioFormat::Mp3,
            timeout_secs: default_tts_timeout(),
        }
    }
}

impl SpeechConfig {
    /// Credential, only when synthesis is enabled
    pub fn credential(&self) -> Option<&ApiKey> {
        if !self.enabled {
            return None;
        }
        self.api_key.as_ref().filter(|key| !key.is_blank())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` and the environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&dir.join(env_name).to_string_lossy()).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("AVATAR_CHAT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    // Validate
    settings.validate()?;

    tracing::debug!(
        openai = settings.providers.openai.credential().is_some(),
        anthropic = settings.providers.anthropic.credential().is_some(),
        speech = settings.speech.credential().is_some(),
        "Settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.providers.openai.model, "gpt-3.5-turbo");
        assert_eq!(settings.providers.openai.max_tokens, 200);
        assert_eq!(settings.providers.openai.temperature, Some(0.8));
        assert_eq!(settings.providers.anthropic.model, "claude-3-haiku-20240307");
        assert!(settings.providers.anthropic.temperature.is_none());
        assert_eq!(settings.speech.voice, "echo");
        assert_eq!(settings.speech.model, "tts-1");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_api_key_is_redacted() {
        let key = ApiKey::new("sk-very-secret");
        assert_eq!(format!("{:?}", key), "ApiKey(****)");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"****\"");
        assert_eq!(key.expose(), "sk-very-secret");
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let mut openai = OpenAiSettings::default();
        openai.api_key = Some(ApiKey::new("   "));
        assert!(openai.credential().is_none());

        openai.api_key = Some(ApiKey::new("sk-test"));
        assert!(openai.credential().is_some());

        let mut anthropic = AnthropicSettings::default();
        anthropic.api_key = None;
        assert!(anthropic.credential().is_none());
    }

    #[test]
    fn test_disabled_speech_has_no_credential() {
        let mut speech = SpeechConfig::default();
        speech.api_key = Some(ApiKey::new("sk-test"));
        assert!(speech.credential().is_some());

        speech.enabled = false;
        assert!(speech.credential().is_none());
    }

    #[test]
    fn test_temperature_validation() {
        let mut settings = Settings::default();
        settings.providers.openai.temperature = Some(1.5);
        assert!(settings.validate().is_ok());

        settings.providers.openai.temperature = Some(2.5);
        assert!(settings.validate().is_err());

        settings.providers.openai.temperature = Some(0.8);
        settings.providers.anthropic.temperature = Some(1.5);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut settings = Settings::default();
        settings.providers.call_timeout_secs = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.providers.anthropic.max_tokens = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_production_requires_cors_origins() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "server.cors_origins"
        ));

        settings.server.cors_origins = vec!["https://chat.example.com".to_string()];
        assert!(settings.validate().is_ok());

        settings.server.cors_enabled = false;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "server.cors_enabled"
        ));
    }

    #[test]
    fn test_development_allows_permissive_cors() {
        let mut settings = Settings::default();
        settings.server.cors_enabled = false;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_speech_speed_validation() {
        let mut settings = Settings::default();
        settings.speech.speed = 5.0;
        assert!(settings.validate().is_err());

        settings.speech.speed = 0.25;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_system_prompt_rejected() {
        let mut settings = Settings::default();
        settings.persona.system_prompt = "  ".to_string();
        assert!(matches!(settings.validate(), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();

        let mut default = std::fs::File::create(dir.path().join("default.toml")).unwrap();
        writeln!(
            default,
            r#"
[server]
port = 9000

[providers.openai]
api_key = "sk-from-file"
model = "gpt-4o-mini"

[speech]
enabled = false
"#
        )
        .unwrap();

        let mut staging = std::fs::File::create(dir.path().join("staging.toml")).unwrap();
        writeln!(
            staging,
            r#"
environment = "staging"

[server]
port = 9100
"#
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.providers.openai.model, "gpt-4o-mini");
        assert_eq!(
            settings.providers.openai.credential().map(ApiKey::expose),
            Some("sk-from-file")
        );
        assert!(!settings.speech.enabled);
        assert!(settings.speech.credential().is_none());

        let settings = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(settings.environment, RuntimeEnvironment::Staging);
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.providers.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_load_english_persona() {
        let dir = tempfile::tempdir().unwrap();
        let mut default = std::fs::File::create(dir.path().join("default.toml")).unwrap();
        writeln!(default, "[persona]\nlanguage = \"en\"").unwrap();

        let settings = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(settings.persona.language, crate::PersonaLanguage::En);
        assert!(settings.persona.system_prompt.contains("conversational English"));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut default = std::fs::File::create(dir.path().join("default.toml")).unwrap();
        writeln!(default, "[speech]\nspeed = 9.0").unwrap();

        assert!(matches!(
            load_settings_from(dir.path(), None),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
