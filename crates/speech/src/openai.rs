//! OpenAI audio speech engine

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use avatar_chat_config::constants::{endpoints, models, timeouts};
use avatar_chat_core::{AudioClip, Result, TextToSpeech, VoiceConfig};

use crate::SpeechError;

/// Configuration for the OpenAI TTS engine
#[derive(Debug, Clone)]
pub struct OpenAiTtsConfig {
    /// API key
    pub api_key: String,
    /// API endpoint, without the `/audio/speech` suffix
    pub endpoint: String,
    /// TTS model (tts-1, tts-1-hd)
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for OpenAiTtsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: endpoints::OPENAI_DEFAULT.to_string(),
            model: models::TTS.to_string(),
            timeout: Duration::from_secs(timeouts::TTS_CALL_SECS),
        }
    }
}

impl OpenAiTtsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenAI TTS engine
pub struct OpenAiTts {
    config: OpenAiTtsConfig,
    client: Client,
}

impl OpenAiTts {
    pub fn new(config: OpenAiTtsConfig) -> std::result::Result<Self, SpeechError> {
        if config.api_key.trim().is_empty() {
            return Err(SpeechError::Configuration("OpenAI API key not provided".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn speech_url(&self) -> String {
        format!("{}/audio/speech", self.config.endpoint.trim_end_matches('/'))
    }

    async fn request_audio(
        &self,
        text: &str,
        voice: &VoiceConfig,
    ) -> std::result::Result<Vec<u8>, SpeechError> {
        let body = SpeechRequest {
            model: &self.config.model,
            input: text,
            voice: &voice.voice_id,
            speed: voice.speed,
            response_format: voice.format.as_str(),
        };

        let response = self.client
            .post(self.speech_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api { status: status.as_u16(), body: error_text });
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        Ok(audio.to_vec())
    }
}

#[async_trait]
impl TextToSpeech for OpenAiTts {
    async fn synthesize(&self, text: &str, config: &VoiceConfig) -> Result<AudioClip> {
        let data = self.request_audio(text, config).await?;
        tracing::debug!(bytes = data.len(), voice = %config.voice_id, "Speech synthesized");
        Ok(AudioClip::new(data, config.format))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'static str,
}
