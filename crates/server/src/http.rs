//! HTTP Endpoints
//!
//! REST API for the avatar chat service.

use std::any::Any;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use avatar_chat_core::ChatReply;

use crate::metrics::{record_orchestration, record_request};
use crate::state::AppState;
use crate::ServerError;

const CHAT_ROUTE: &str = "/api/chat";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        // Chat endpoint; any other verb gets 405
        .route(CHAT_ROUTE, post(chat).fallback(method_not_allowed))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let localhost = || {
        CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
            .allow_headers(cors::Any)
    };

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return localhost();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return localhost();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Chat endpoint
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ServerError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    let result = handle_chat(&state, payload).instrument(span).await;

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    record_request(CHAT_ROUTE, status);

    result
}

async fn handle_chat(
    state: &AppState,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ServerError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "Rejected chat payload");
        ServerError::InvalidRequest(rejection.body_text())
    })?;

    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("Message is required".to_string()))?;

    tracing::debug!(chars = message.chars().count(), "Chat request");

    let start = Instant::now();
    let outcome = state.orchestrator.orchestrate(&message).await;
    record_orchestration(&outcome, start.elapsed());

    tracing::info!(
        source = outcome.source.label(),
        emotion = %outcome.reply.emotion,
        latency_ms = start.elapsed().as_millis() as u64,
        "Chat reply sent"
    );

    Ok(Json(outcome.reply))
}

async fn method_not_allowed() -> ServerError {
    record_request(CHAT_ROUTE, StatusCode::METHOD_NOT_ALLOWED);
    ServerError::MethodNotAllowed
}

/// Health check
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let providers = state.orchestrator.providers();

    let status = if providers.is_empty() { "degraded" } else { "healthy" };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
            "checks": {
                "providers": {
                    "openai": providers.primary.is_some(),
                    "anthropic": providers.secondary.is_some(),
                },
                "speech": state.orchestrator.speech_enabled(),
            }
        })),
    )
}

/// Prometheus metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => ServerError::NotFound.into_response(),
    }
}

/// Convert a handler panic into a generic 500
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    record_request("panic", StatusCode::INTERNAL_SERVER_ERROR);
    ServerError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use avatar_chat_agent::ResponseOrchestrator;
    use avatar_chat_config::{PersonaConfig, Settings};
    use avatar_chat_llm::ProviderSet;
    use avatar_chat_speech::SpeechSynthesizer;

    fn state() -> AppState {
        let orchestrator = ResponseOrchestrator::new(
            ProviderSet::default(),
            SpeechSynthesizer::disabled(),
            PersonaConfig::default(),
            Duration::from_secs(1),
        );
        AppState::new(Settings::default(), orchestrator)
    }

    #[test]
    fn test_router_creation() {
        let _ = create_router(state());
    }

    #[test]
    fn test_cors_layer_variants() {
        let _ = build_cors_layer(&[], false);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["https://chat.example.com".to_string()], true);
        let _ = build_cors_layer(&["bad\norigin".to_string()], true);
    }

    #[test]
    fn test_chat_request_message_optional() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_none());

        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(req.message.as_deref(), Some("hi"));

        assert!(serde_json::from_str::<ChatRequest>(r#"{"message":42}"#).is_err());
    }
}
