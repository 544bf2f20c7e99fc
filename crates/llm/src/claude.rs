//! Claude Backend
//!
//! Implements the Anthropic Messages API for single-turn text replies.
//! The system prompt travels in the top-level `system` field, not as a message.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use avatar_chat_config::constants::{endpoints, timeouts};
use avatar_chat_core::{CompletionRequest, ProviderKind};

use crate::backend::{non_empty, LlmBackend};
use crate::prompt::{turn_messages, Role};
use crate::LlmError;

/// Configuration for Claude backend
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    /// API key
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// API endpoint (for testing or proxy)
    pub endpoint: String,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout: Duration::from_secs(timeouts::LLM_CALL_SECS),
            endpoint: endpoints::ANTHROPIC_DEFAULT.to_string(),
        }
    }
}

impl ClaudeConfig {
    /// Create config with API key
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

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Claude backend
pub struct ClaudeBackend {
    config: ClaudeConfig,
    client: Client,
}

impl ClaudeBackend {
    /// Create a new Claude backend
    pub fn new(config: ClaudeConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "ANTHROPIC_API_KEY not set. Set it via environment or config.".to_string()
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.endpoint.trim_end_matches('/'))
    }

    fn build_request(request: &CompletionRequest) -> ClaudeRequest {
        let messages = turn_messages(request);

        let system = messages.iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone());

        let messages = messages.into_iter()
            .filter(|m| m.role != Role::System)
            .map(|m| ClaudeMessage {
                role: m.role.as_str(),
                content: m.content,
            })
            .collect();

        ClaudeRequest {
            model: request.options.model.clone(),
            max_tokens: request.options.max_tokens,
            messages,
            system,
            temperature: request.options.temperature,
        }
    }

    /// Concatenate the text blocks of a response
    fn response_text(response: ClaudeApiResponse) -> String {
        let mut text = String::new();
        for block in response.content {
            if let ClaudeContentBlock::Text { text: t } = block {
                text.push_str(&t);
            }
        }
        text
    }
}

#[async_trait]
impl LlmBackend for ClaudeBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = Self::build_request(request);

        let response = self.client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", endpoints::ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status: status.as_u16(), body: error_text });
        }

        let response: ClaudeApiResponse = response.json().await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            model = %request.options.model,
            stop_reason = ?response.stop_reason,
            "Claude completion received"
        );

        non_empty(Self::response_text(response))
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }
}

// =============================================================================
// Claude API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: usize,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ClaudeApiResponse {
    content: Vec<ClaudeContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_chat_core::CompletionOptions;
    use mockito::Matcher;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest::new(
            "You are helpful",
            "Hello",
            CompletionOptions::new("claude-3-haiku-20240307", 200),
        )
    }

    #[test]
    fn test_config_requires_key() {
        assert!(ClaudeBackend::new(ClaudeConfig::new("")).is_err());
        assert!(ClaudeBackend::new(ClaudeConfig::new("sk-ant-test")).is_ok());
    }

    #[test]
    fn test_request_serialization() {
        let json = serde_json::to_value(ClaudeBackend::build_request(&request())).unwrap();

        assert_eq!(json["model"], "claude-3-haiku-20240307");
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["system"], "You are helpful");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "Hello"},
                {"type": "tool_use", "id": "t1", "name": "lookup", "input": {}},
                {"type": "text", "text": " there!"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;

        let response: ClaudeApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(ClaudeBackend::response_text(response), "Hello there!");
    }

    #[tokio::test]
    async fn test_complete_sends_anthropic_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(json!({"system": "You are helpful"})))
            .with_status(200)
            .with_body(
                json!({
                    "content": [{"type": "text", "text": "Hi from Claude"}],
                    "stop_reason": "end_turn"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let backend =
            ClaudeBackend::new(ClaudeConfig::new("sk-ant-test").with_endpoint(server.url()))
                .unwrap();
        let text = backend.complete(&request()).await.unwrap();

        assert_eq!(text, "Hi from Claude");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_without_text_blocks_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(r#"{"content": [], "stop_reason": "max_tokens"}"#)
            .create_async()
            .await;

        let backend =
            ClaudeBackend::new(ClaudeConfig::new("sk-ant-test").with_endpoint(server.url()))
                .unwrap();
        let err = backend.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_complete_maps_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body(r#"{"type":"error","error":{"type":"overloaded_error"}}"#)
            .create_async()
            .await;

        let backend =
            ClaudeBackend::new(ClaudeConfig::new("sk-ant-test").with_endpoint(server.url()))
                .unwrap();
        let err = backend.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 529, .. }));
    }
}
