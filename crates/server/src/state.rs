//! Application State
//!
//! Shared state across all handlers. Everything here is immutable after start-up.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use avatar_chat_agent::ResponseOrchestrator;
use avatar_chat_config::Settings;

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub orchestrator: Arc<ResponseOrchestrator>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(settings: Settings, orchestrator: ResponseOrchestrator) -> Self {
        Self {
            settings: Arc::new(settings),
            orchestrator: Arc::new(orchestrator),
            metrics: None,
        }
    }

    /// Build providers and speech from settings
    pub fn from_settings(settings: Settings) -> Result<Self, ServerError> {
        let orchestrator = ResponseOrchestrator::from_settings(&settings)?;
        Ok(Self::new(settings, orchestrator))
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
