//! Speech processing traits

use crate::{AudioClip, Result, VoiceConfig};
use async_trait::async_trait;

/// Text-to-Speech interface
///
/// Implementations:
/// - `OpenAiTts` - OpenAI audio speech API
///
/// # Example
///
/// ```ignore
/// let tts: Arc<dyn TextToSpeech> = Arc::new(OpenAiTts::new(config)?);
/// let audio = tts.synthesize("你好", &VoiceConfig::default()).await?;
/// ```
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Synthesize text to encoded audio
    ///
    /// # Arguments
    /// * `text` - Text to synthesize
    /// * `config` - Voice, speed and output format
    async fn synthesize(&self, text: &str, config: &VoiceConfig) -> Result<AudioClip>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
