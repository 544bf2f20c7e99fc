//! Best-effort reply synthesis
//!
//! Wraps an optional [`TextToSpeech`] engine. Every outcome is reported as a
//! [`Synthesis`] value; a failed or slow engine only means the reply goes out
//! without audio.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use avatar_chat_config::SpeechConfig;
use avatar_chat_core::{TextToSpeech, VoiceConfig};

use crate::openai::{OpenAiTts, OpenAiTtsConfig};
use crate::SpeechError;

/// Outcome of one synthesis attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    /// Base64-encoded audio
    Audio(String),
    /// No engine configured
    Unconfigured,
    /// Engine error or timeout
    Failed(String),
}

impl Synthesis {
    pub fn into_audio(self) -> Option<String> {
        match self {
            Synthesis::Audio(audio) => Some(audio),
            _ => None,
        }
    }

    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Synthesis::Audio(_) => "ok",
            Synthesis::Unconfigured => "skipped",
            Synthesis::Failed(_) => "failed",
        }
    }
}

/// Speech synthesizer with a bounded wait
#[derive(Clone)]
pub struct SpeechSynthesizer {
    engine: Option<Arc<dyn TextToSpeech>>,
    voice: VoiceConfig,
    timeout: Duration,
}

impl SpeechSynthesizer {
    pub fn new(engine: Option<Arc<dyn TextToSpeech>>, voice: VoiceConfig, timeout: Duration) -> Self {
        Self { engine, voice, timeout }
    }

    /// Synthesizer that never produces audio
    pub fn disabled() -> Self {
        Self::new(None, VoiceConfig::default(), Duration::from_secs(1))
    }

    /// Build from settings; no credential (or `enabled = false`) disables synthesis
    pub fn from_settings(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let voice = VoiceConfig::default()
            .with_voice_id(&config.voice)
            .with_speed(config.speed)
            .with_format(config.response_format);

        let engine: Option<Arc<dyn TextToSpeech>> = match config.credential() {
            Some(key) => {
                let tts = OpenAiTts::new(
                    OpenAiTtsConfig::new(key.expose())
                        .with_endpoint(&config.endpoint)
                        .with_model(&config.model)
                        .with_timeout(config.timeout()),
                )?;
                Some(Arc::new(tts))
            }
            None => None,
        };

        tracing::info!(enabled = engine.is_some(), voice = %voice.voice_id, "Speech synthesis configured");

        Ok(Self::new(engine, voice, config.timeout()))
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.is_some()
    }

    /// Synthesize `text` and encode it as base64
    pub async fn synthesize(&self, text: &str) -> Synthesis {
        let Some(engine) = self.engine.as_ref() else {
            return Synthesis::Unconfigured;
        };

        match tokio::time::timeout(self.timeout, engine.synthesize(text, &self.voice)).await {
            Ok(Ok(clip)) if !clip.is_empty() => Synthesis::Audio(STANDARD.encode(&clip.data)),
            Ok(Ok(_)) => {
                tracing::warn!("Speech engine returned empty audio");
                Synthesis::Failed("empty audio".to_string())
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Speech synthesis failed");
                Synthesis::Failed(e.to_string())
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "Speech synthesis timed out");
                Synthesis::Failed("timeout".to_string())
            }
        }
    }
}

impl std::fmt::Debug for SpeechSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechSynthesizer")
            .field("enabled", &self.is_enabled())
            .field("voice", &self.voice)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use avatar_chat_config::ApiKey;
    use avatar_chat_core::{AudioClip, AudioFormat, Error, Result};

    struct FixedTts(Vec<u8>);

    #[async_trait]
    impl TextToSpeech for FixedTts {
        async fn synthesize(&self, _text: &str, config: &VoiceConfig) -> Result<AudioClip> {
            Ok(AudioClip::new(self.0.clone(), config.format))
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingTts;

    #[async_trait]
    impl TextToSpeech for FailingTts {
        async fn synthesize(&self, _text: &str, _config: &VoiceConfig) -> Result<AudioClip> {
            Err(Error::Tts("boom".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    struct SlowTts;

    #[async_trait]
    impl TextToSpeech for SlowTts {
        async fn synthesize(&self, _text: &str, config: &VoiceConfig) -> Result<AudioClip> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(AudioClip::new(vec![1, 2, 3], config.format))
        }

        fn model_name(&self) -> &str {
            "slow"
        }
    }

    fn with_engine(engine: impl TextToSpeech) -> SpeechSynthesizer {
        SpeechSynthesizer::new(
            Some(Arc::new(engine)),
            VoiceConfig::default(),
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn test_audio_is_base64() {
        let synth = with_engine(FixedTts(b"hello".to_vec()));
        assert_eq!(synth.synthesize("hi").await, Synthesis::Audio("aGVsbG8=".to_string()));
    }

    #[tokio::test]
    async fn test_disabled_skips() {
        let synth = SpeechSynthesizer::disabled();
        assert!(!synth.is_enabled());
        assert_eq!(synth.synthesize("hi").await, Synthesis::Unconfigured);
    }

    #[tokio::test]
    async fn test_engine_error_is_absorbed() {
        let outcome = with_engine(FailingTts).synthesize("hi").await;
        assert!(matches!(outcome, Synthesis::Failed(_)));
        assert!(outcome.into_audio().is_none());
    }

    #[tokio::test]
    async fn test_empty_audio_is_failure() {
        let outcome = with_engine(FixedTts(Vec::new())).synthesize("hi").await;
        assert!(matches!(outcome, Synthesis::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_engine_times_out() {
        let outcome = with_engine(SlowTts).synthesize("hi").await;
        assert_eq!(outcome, Synthesis::Failed("timeout".to_string()));
    }

    #[test]
    fn test_from_settings_without_key_is_disabled() {
        let mut config = SpeechConfig::default();
        config.api_key = None;
        assert!(!SpeechSynthesizer::from_settings(&config).unwrap().is_enabled());

        config.api_key = Some(ApiKey::new("sk-test"));
        config.enabled = false;
        assert!(!SpeechSynthesizer::from_settings(&config).unwrap().is_enabled());
    }

    #[test]
    fn test_from_settings_with_key_is_enabled() {
        let mut config = SpeechConfig::default();
        config.api_key = Some(ApiKey::new("sk-test"));
        config.response_format = AudioFormat::Opus;

        let synth = SpeechSynthesizer::from_settings(&config).unwrap();
        assert!(synth.is_enabled());
        assert_eq!(synth.voice.format, AudioFormat::Opus);
        assert_eq!(synth.voice.voice_id, "echo");
    }
}
