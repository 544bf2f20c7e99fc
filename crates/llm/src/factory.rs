//! LLM Factory
//!
//! Builds the ordered provider set from settings. A provider whose credential
//! is absent or blank is left out; the order is fixed (OpenAI, then Anthropic).

use std::sync::Arc;

use avatar_chat_config::{AnthropicSettings, OpenAiSettings, ProvidersConfig};
use avatar_chat_core::{CompletionOptions, ProviderKind};

use crate::{
    backend::{LlmBackend, OpenAIBackend, OpenAIConfig},
    claude::{ClaudeBackend, ClaudeConfig},
    LlmError,
};

/// A configured provider: the backend plus its per-call generation options
#[derive(Clone)]
pub struct ProviderSlot {
    pub backend: Arc<dyn LlmBackend>,
    pub options: CompletionOptions,
}

impl ProviderSlot {
    pub fn new(backend: Arc<dyn LlmBackend>, options: CompletionOptions) -> Self {
        Self { backend, options }
    }

    pub fn kind(&self) -> ProviderKind {
        self.backend.provider()
    }
}

impl std::fmt::Debug for ProviderSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSlot")
            .field("provider", &self.kind())
            .field("options", &self.options)
            .finish()
    }
}

/// Providers in priority order
#[derive(Debug, Clone, Default)]
pub struct ProviderSet {
    pub primary: Option<ProviderSlot>,
    pub secondary: Option<ProviderSlot>,
}

impl ProviderSet {
    pub fn new(primary: Option<ProviderSlot>, secondary: Option<ProviderSlot>) -> Self {
        Self { primary, secondary }
    }

    /// True when no provider has a credential
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}

/// LLM Factory for creating provider backends
pub struct LlmFactory;

impl LlmFactory {
    /// Create the provider set from settings
    pub fn create(config: &ProvidersConfig) -> Result<ProviderSet, LlmError> {
        let primary = Self::openai_slot(config)?;
        let secondary = Self::anthropic_slot(config)?;

        tracing::info!(
            primary = primary.is_some(),
            secondary = secondary.is_some(),
            "LLM providers configured"
        );

        Ok(ProviderSet::new(primary, secondary))
    }

    fn openai_slot(config: &ProvidersConfig) -> Result<Option<ProviderSlot>, LlmError> {
        let settings: &OpenAiSettings = &config.openai;
        let Some(key) = settings.credential() else {
            return Ok(None);
        };

        let backend = OpenAIBackend::new(
            OpenAIConfig::new(key.expose())
                .with_endpoint(&settings.endpoint)
                .with_organization(settings.organization.clone())
                .with_timeout(config.call_timeout()),
        )?;

        let mut options = CompletionOptions::new(&settings.model, settings.max_tokens);
        if let Some(t) = settings.temperature {
            options = options.with_temperature(t);
        }

        Ok(Some(ProviderSlot::new(Arc::new(backend), options)))
    }

    fn anthropic_slot(config: &ProvidersConfig) -> Result<Option<ProviderSlot>, LlmError> {
        let settings: &AnthropicSettings = &config.anthropic;
        let Some(key) = settings.credential() else {
            return Ok(None);
        };

        let backend = ClaudeBackend::new(
            ClaudeConfig::new(key.expose())
                .with_endpoint(&settings.endpoint)
                .with_timeout(config.call_timeout()),
        )?;

        let mut options = CompletionOptions::new(&settings.model, settings.max_tokens);
        if let Some(t) = settings.temperature {
            options = options.with_temperature(t);
        }

        Ok(Some(ProviderSlot::new(Arc::new(backend), options)))
    }
}
