//! LLM backend trait and the OpenAI chat completions backend

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use avatar_chat_config::constants::{endpoints, timeouts};
use avatar_chat_core::{CompletionRequest, ProviderKind};

use crate::prompt::{turn_messages, Message};
use crate::LlmError;

/// LLM Backend trait
///
/// One stateless completion per call. Implementations return
/// `LlmError::EmptyCompletion` rather than an empty string.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate the reply text for one turn
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Which provider this backend talks to
    fn provider(&self) -> ProviderKind;
}

/// Reject completions with no visible text
pub(crate) fn non_empty(text: String) -> Result<String, LlmError> {
    if text.trim().is_empty() {
        Err(LlmError::EmptyCompletion)
    } else {
        Ok(text)
    }
}

/// Configuration for the OpenAI backend
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API endpoint (https://api.openai.com/v1 or a compatible proxy)
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Organization ID (OpenAI specific)
    pub organization: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::OPENAI_DEFAULT.to_string(),
            api_key: String::new(),
            organization: None,
            timeout: Duration::from_secs(timeouts::LLM_CALL_SECS),
        }
    }
}

impl OpenAIConfig {
    /// Create config for OpenAI
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Point at a different base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenAI chat completions backend
pub struct OpenAIBackend {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIBackend {
    /// Create new OpenAI backend
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration("OpenAI API key required".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the full API URL for chat completions
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    /// Build request headers
    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::HeaderValue;

        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", self.config.api_key);
        if let Ok(val) = HeaderValue::from_str(&auth_value) {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }

        if let Some(ref org) = self.config.organization {
            if let Ok(val) = HeaderValue::from_str(org) {
                headers.insert("OpenAI-Organization", val);
            }
        }

        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        headers
    }

    fn build_request(request: &CompletionRequest) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: request.options.model.clone(),
            messages: turn_messages(request).iter().map(OpenAIMessage::from).collect(),
            max_tokens: Some(request.options.max_tokens),
            temperature: request.options.temperature,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = Self::build_request(request);

        let response = self.client
            .post(self.chat_url())
            .headers(self.build_headers())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status: status.as_u16(), body: error_text });
        }

        let response: OpenAIChatResponse = response.json().await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = response.choices.into_iter().next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        tracing::debug!(
            model = %request.options.model,
            finish_reason = ?choice.finish_reason,
            "OpenAI completion received"
        );

        non_empty(choice.message.content.unwrap_or_default())
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

impl From<&Message> for OpenAIMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_chat_core::CompletionOptions;
    use mockito::Matcher;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest::new(
            "You are a guide",
            "Hello",
            CompletionOptions::new("gpt-3.5-turbo", 200).with_temperature(0.8),
        )
    }

    fn backend(endpoint: &str) -> OpenAIBackend {
        OpenAIBackend::new(OpenAIConfig::new("sk-test").with_endpoint(endpoint)).unwrap()
    }

    #[test]
    fn test_openai_config_default() {
        let config = OpenAIConfig::default();
        assert_eq!(config.endpoint, "https://api.openai.com/v1");
        assert!(config.api_key.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_openai_backend_requires_key() {
        assert!(matches!(
            OpenAIBackend::new(OpenAIConfig::new("  ")),
            Err(LlmError::Configuration(_))
        ));
        assert!(OpenAIBackend::new(OpenAIConfig::new("sk-xxx")).is_ok());
    }

    #[test]
    fn test_openai_chat_url() {
        let backend = backend("https://api.openai.com/v1/");
        assert_eq!(backend.chat_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_openai_request_serialization() {
        let json = serde_json::to_value(OpenAIBackend::build_request(&request())).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hello");
        assert!((json["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_temperature_omitted_when_unset() {
        let request = CompletionRequest::new("s", "u", CompletionOptions::new("gpt-4o", 50));
        let json = serde_json::to_value(OpenAIBackend::build_request(&request)).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 200
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "Hi there!"}, "finish_reason": "stop"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = backend(&server.url()).complete(&request()).await.unwrap();
        assert_eq!(text, "Hi there!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_maps_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = backend(&server.url()).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"content": "   "}}]}).to_string())
            .create_async()
            .await;

        let err = backend(&server.url()).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_complete_rejects_missing_choices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = backend(&server.url()).complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
