//! Read-only snapshots of every monitored namespace, served by the HTTP API

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::models::{ClusterHealth, ClusterState, PodObservation};

#[derive(Debug, Clone, Serialize)]
pub struct NamespaceStatus {
    pub namespace: String,
    pub health: ClusterHealth,
    pub unhealthy_pods: Vec<PodObservation>,
    pub tracked_pods: usize,
    /// Wall-clock instant the current state was first observed
    pub state_since: DateTime<Utc>,
    pub kills: u64,
    pub updated_at: DateTime<Utc>,
}

impl NamespaceStatus {
    pub fn from_state(
        namespace: &str,
        state: &ClusterState,
        tracked_pods: usize,
        kills: u64,
        now: Instant,
    ) -> Self {
        let updated_at = Utc::now();
        let age = chrono::Duration::from_std(now.saturating_duration_since(state.since))
            .unwrap_or_else(|_| chrono::Duration::zero());

        Self {
            namespace: namespace.to_string(),
            health: state.health,
            unhealthy_pods: state.unhealthy_pods.values().cloned().collect(),
            tracked_pods,
            state_since: updated_at - age,
            kills,
            updated_at,
        }
    }
}

/// Namespace name to latest snapshot. Each monitor writes only its own entry;
/// the supervisor removes entries of deleted namespaces.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<HashMap<String, NamespaceStatus>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn publish(&self, status: NamespaceStatus) {
        self.inner
            .write()
            .await
            .insert(status.namespace.clone(), status);
    }

    pub async fn remove(&self, namespace: &str) {
        self.inner.write().await.remove(namespace);
    }

    pub async fn get(&self, namespace: &str) -> Option<NamespaceStatus> {
        self.inner.read().await.get(namespace).cloned()
    }

    /// All snapshots sorted by namespace name
    pub async fn list(&self) -> Vec<NamespaceStatus> {
        let mut statuses: Vec<_> = self.inner.read().await.values().cloned().collect();
        statuses.sort_by(|a, b| a.namespace.cmp(&b.namespace));
        statuses
    }
}
