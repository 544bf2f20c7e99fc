//! Provider-fallback reply orchestration
//!
//! One stateless turn: primary provider, then secondary, then a static
//! fallback. Text from a provider is classified and (best effort) voiced.
//! Provider trouble never escapes as an error; it only changes which step
//! produced the reply.

use std::time::{Duration, Instant};

use avatar_chat_config::{PersonaConfig, Settings};
use avatar_chat_core::{ChatReply, CompletionRequest, EmotionTag, ProviderKind};
use avatar_chat_llm::{LlmError, LlmFactory, ProviderSet, ProviderSlot};
use avatar_chat_speech::{SpeechSynthesizer, Synthesis};

use crate::emotion::EmotionClassifier;
use crate::AgentError;

/// Result of one provider step
#[derive(Debug)]
pub enum ProviderOutcome {
    /// The provider produced reply text
    Completed(String),
    /// No credential, so the provider was never built
    Unavailable,
    /// The call was made and failed (including timeouts and empty text)
    Failed(LlmError),
}

impl ProviderOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderOutcome::Completed(_) => "completed",
            ProviderOutcome::Unavailable => "unavailable",
            ProviderOutcome::Failed(LlmError::Timeout) => "timeout",
            ProviderOutcome::Failed(_) => "failed",
        }
    }
}

/// One entry of the per-request attempt log
#[derive(Debug)]
pub struct ProviderAttempt {
    pub provider: ProviderKind,
    pub outcome: ProviderOutcome,
    pub latency: Duration,
}

/// Why the static reply was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No provider has a credential
    NotConfigured,
    /// Every configured provider failed
    ProvidersFailed,
}

/// Which step produced the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Provider(ProviderKind),
    Fallback(FallbackReason),
}

impl ReplySource {
    pub fn label(&self) -> &'static str {
        match self {
            ReplySource::Provider(kind) => kind.as_str(),
            ReplySource::Fallback(FallbackReason::NotConfigured) => "fallback_not_configured",
            ReplySource::Fallback(FallbackReason::ProvidersFailed) => "fallback_providers_failed",
        }
    }
}

/// A reply plus how it was produced
#[derive(Debug)]
pub struct Orchestrated {
    pub reply: ChatReply,
    pub source: ReplySource,
    pub attempts: Vec<ProviderAttempt>,
    /// `None` on the static fallback path, where synthesis is not attempted
    pub synthesis: Option<Synthesis>,
    pub synthesis_latency: Option<Duration>,
}

/// Response orchestrator
///
/// Built once at start-up and shared read-only across requests.
pub struct ResponseOrchestrator {
    providers: ProviderSet,
    speech: SpeechSynthesizer,
    classifier: EmotionClassifier,
    persona: PersonaConfig,
    call_timeout: Duration,
}

impl ResponseOrchestrator {
    pub fn new(
        providers: ProviderSet,
        speech: SpeechSynthesizer,
        persona: PersonaConfig,
        call_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            speech,
            classifier: EmotionClassifier::default(),
            persona,
            call_timeout,
        }
    }

    /// Build providers and speech from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, AgentError> {
        let providers = LlmFactory::create(&settings.providers)?;
        let speech = SpeechSynthesizer::from_settings(&settings.speech)?;

        Ok(Self::new(
            providers,
            speech,
            settings.persona.clone(),
            settings.providers.call_timeout(),
        ))
    }

    pub fn with_classifier(mut self, classifier: EmotionClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech.is_enabled()
    }

    /// Produce the reply for one user message
    pub async fn respond(&self, user_message: &str) -> ChatReply {
        self.orchestrate(user_message).await.reply
    }

    /// Produce the reply along with the attempt log
    pub async fn orchestrate(&self, user_message: &str) -> Orchestrated {
        let mut attempts = Vec::with_capacity(2);

        let steps = [
            (ProviderKind::OpenAI, self.providers.primary.as_ref()),
            (ProviderKind::Anthropic, self.providers.secondary.as_ref()),
        ];

        for (position, slot) in steps {
            let attempt = self.attempt(position, slot, user_message).await;

            if let ProviderOutcome::Completed(text) = &attempt.outcome {
                let text = text.clone();
                let provider = attempt.provider;
                attempts.push(attempt);
                return self.finish(text, provider, attempts).await;
            }

            attempts.push(attempt);
        }

        self.fallback(attempts)
    }

    async fn attempt(
        &self,
        position: ProviderKind,
        slot: Option<&ProviderSlot>,
        user_message: &str,
    ) -> ProviderAttempt {
        let Some(slot) = slot else {
            tracing::debug!(provider = %position, "Provider not configured, skipping");
            return ProviderAttempt {
                provider: position,
                outcome: ProviderOutcome::Unavailable,
                latency: Duration::ZERO,
            };
        };

        let provider = slot.kind();
        let request = CompletionRequest::new(
            self.persona.system_prompt.as_str(),
            user_message,
            slot.options.clone(),
        );

        let start = Instant::now();
        let result = tokio::time::timeout(self.call_timeout, slot.backend.complete(&request))
            .await
            .unwrap_or_else(|_| Err(LlmError::Timeout));
        let latency = start.elapsed();

        let outcome = match result {
            Ok(text) => {
                tracing::debug!(
                    provider = %provider,
                    latency_ms = latency.as_millis() as u64,
                    "Provider completed"
                );
                ProviderOutcome::Completed(text)
            }
            Err(e) => {
                tracing::warn!(
                    provider = %provider,
                    error = %e,
                    latency_ms = latency.as_millis() as u64,
                    "Provider call failed, falling back"
                );
                ProviderOutcome::Failed(e)
            }
        };

        ProviderAttempt { provider, outcome, latency }
    }

    async fn finish(
        &self,
        text: String,
        provider: ProviderKind,
        attempts: Vec<ProviderAttempt>,
    ) -> Orchestrated {
        let emotion = self.classifier.classify(&text);

        let start = Instant::now();
        let synthesis = self.speech.synthesize(&text).await;
        let synthesis_latency = start.elapsed();

        let reply = ChatReply::new(text, emotion).with_audio(synthesis.clone().into_audio());

        tracing::info!(
            provider = %provider,
            emotion = %emotion,
            audio = reply.has_audio(),
            "Reply ready"
        );

        Orchestrated {
            reply,
            source: ReplySource::Provider(provider),
            attempts,
            synthesis: Some(synthesis),
            synthesis_latency: Some(synthesis_latency),
        }
    }

    fn fallback(&self, attempts: Vec<ProviderAttempt>) -> Orchestrated {
        let configured = attempts
            .iter()
            .any(|a| !matches!(a.outcome, ProviderOutcome::Unavailable));

        let (reason, text) = if configured {
            (FallbackReason::ProvidersFailed, &self.persona.provider_error_message)
        } else {
            (FallbackReason::NotConfigured, &self.persona.not_configured_message)
        };

        tracing::info!(reason = ?reason, "Using static fallback reply");

        Orchestrated {
            reply: ChatReply::new(text.as_str(), EmotionTag::Talking),
            source: ReplySource::Fallback(reason),
            attempts,
            synthesis: None,
            synthesis_latency: None,
        }
    }
}
