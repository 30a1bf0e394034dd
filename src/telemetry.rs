//! Metrics sink injected into every namespace monitor

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the counter incremented each time a pod is killed
pub const PODS_KILLED_TOTAL: &str = "pods_killed_total";

/// Receives the side-effect metrics of the retaliation loop.
///
/// Called concurrently from the monitors of different namespaces.
pub trait MetricsSink: Send + Sync {
    fn pod_killed(&self, namespace: &str);

    /// Total kills recorded by this sink across all namespaces
    fn kills_total(&self) -> u64;
}

/// Sink backed by the `metrics` facade, exported in Prometheus format
#[derive(Debug, Default)]
pub struct PrometheusMetrics {
    kills: AtomicU64,
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        metrics::describe_counter!(
            PODS_KILLED_TOTAL,
            "The total number of times a pod has been killed by the watchdog"
        );
        Self::default()
    }
}

impl MetricsSink for PrometheusMetrics {
    fn pod_killed(&self, namespace: &str) {
        self.kills.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(PODS_KILLED_TOTAL, 1, "namespace" => namespace.to_string());
    }

    fn kills_total(&self) -> u64 {
        self.kills.load(Ordering::Relaxed)
    }
}

/// Install the global Prometheus recorder and return the handle used to render `/metrics`
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}
