//! Prometheus metrics
//!
//! Recording goes through the `metrics` facade, so every `record_*` call is a
//! no-op until [`init_metrics`] installs the recorder.

use std::time::Duration;

use axum::http::StatusCode;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use avatar_chat_agent::{Orchestrated, ProviderAttempt, ProviderOutcome};
use avatar_chat_speech::Synthesis;

use crate::ServerError;

const LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0];

/// Install the global Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Suffix("_seconds".to_string()), LATENCY_BUCKETS)
        .map_err(|e| ServerError::Internal(format!("metrics buckets: {}", e)))?
        .install_recorder()
        .map_err(|e| ServerError::Internal(format!("metrics recorder: {}", e)))
}

/// Count a handled request
pub fn record_request(route: &'static str, status: StatusCode) {
    ::metrics::counter!(
        "avatar_chat_requests_total",
        "route" => route,
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}

/// Record everything one chat turn produced
pub fn record_orchestration(outcome: &Orchestrated, total: Duration) {
    for attempt in &outcome.attempts {
        record_provider_attempt(attempt);
    }

    if let (Some(synthesis), Some(latency)) = (&outcome.synthesis, outcome.synthesis_latency) {
        record_tts(synthesis, latency);
    }

    ::metrics::counter!("avatar_chat_replies_total", "source" => outcome.source.label())
        .increment(1);
    ::metrics::counter!("avatar_chat_emotions_total", "emotion" => outcome.reply.emotion.as_str())
        .increment(1);
    ::metrics::histogram!("avatar_chat_reply_latency_seconds").record(total.as_secs_f64());
}

fn record_provider_attempt(attempt: &ProviderAttempt) {
    let provider = attempt.provider.as_str();

    ::metrics::counter!(
        "avatar_chat_provider_attempts_total",
        "provider" => provider,
        "outcome" => attempt.outcome.label()
    )
    .increment(1);

    if !matches!(attempt.outcome, ProviderOutcome::Unavailable) {
        ::metrics::histogram!("avatar_chat_provider_latency_seconds", "provider" => provider)
            .record(attempt.latency.as_secs_f64());
    }
}

fn record_tts(synthesis: &Synthesis, latency: Duration) {
    ::metrics::counter!("avatar_chat_tts_total", "outcome" => synthesis.label()).increment(1);

    if !matches!(synthesis, Synthesis::Unconfigured) {
        ::metrics::histogram!("avatar_chat_tts_latency_seconds").record(latency.as_secs_f64());
    }
}
