//! Kubernetes integration for the watchdog
//!
//! This module exposes the three cluster capabilities the control loop consumes:
//! - Watching the namespace lifecycle
//! - Watching the pods of one namespace
//! - Deleting a pod

mod client;
mod events;

pub use client::K8sClient;
pub use events::{map_watch_event, namespace_name, pod_observation, EventStream, ResourceEvent};

use async_trait::async_trait;

use crate::error::WatchdogResult;
use crate::models::PodObservation;

/// Cluster API capability consumed by the supervisor and the monitors.
///
/// A returned stream ending (`None`) means the server closed the watch.
#[async_trait]
pub trait ClusterApi: Send + Sync + 'static {
    async fn watch_namespaces(&self) -> WatchdogResult<EventStream<String>>;

    async fn watch_pods(&self, namespace: &str) -> WatchdogResult<EventStream<PodObservation>>;

    async fn delete_pod(
        &self,
        namespace: &str,
        name: &str,
        grace_period_seconds: u32,
    ) -> WatchdogResult<()>;
}
