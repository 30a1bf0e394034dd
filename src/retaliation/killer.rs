use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::WatchdogResult;
use crate::k8s::ClusterApi;
use crate::models::PodObservation;

/// Capability to kill a pod, invoked with (namespace, pod name, last observation)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PodKiller: Send + Sync {
    async fn kill(&self, namespace: &str, pod_name: &str, pod: &PodObservation)
        -> WatchdogResult<()>;
}

/// Only logs the pod that would have been killed
#[derive(Debug, Default, Clone)]
pub struct DryRunKiller;

#[async_trait]
impl PodKiller for DryRunKiller {
    async fn kill(
        &self,
        namespace: &str,
        pod_name: &str,
        pod: &PodObservation,
    ) -> WatchdogResult<()> {
        info!(namespace, pod = pod_name, phase = %pod.phase, "FAKE killing pod (dry run)");
        Ok(())
    }
}

/// Deletes the pod through the cluster API
pub struct ApiKiller<C> {
    api: Arc<C>,
    grace_period_seconds: u32,
}

impl<C: ClusterApi> ApiKiller<C> {
    pub fn new(api: Arc<C>, grace_period_seconds: u32) -> Self {
        Self {
            api,
            grace_period_seconds,
        }
    }
}

#[async_trait]
impl<C: ClusterApi> PodKiller for ApiKiller<C> {
    async fn kill(
        &self,
        namespace: &str,
        pod_name: &str,
        pod: &PodObservation,
    ) -> WatchdogResult<()> {
        warn!(namespace, pod = pod_name, phase = %pod.phase, "KILLING pod");
        self.api
            .delete_pod(namespace, pod_name, self.grace_period_seconds)
            .await
    }
}
