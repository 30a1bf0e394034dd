//! Read-only operator surface: liveness, Prometheus metrics and namespace status

pub mod health;
pub mod metrics;
pub mod namespaces;
pub mod response;

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::Config;
use crate::telemetry::MetricsSink;
use crate::watchdog::StatusBoard;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub status: StatusBoard,
    pub metrics: Arc<dyn MetricsSink>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Config, status: StatusBoard, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            config,
            status,
            metrics,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
