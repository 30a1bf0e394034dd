//! Kubernetes client wrapper for the watchdog

use async_trait::async_trait;
use futures::{future, StreamExt};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::{
    api::{Api, DeleteParams, WatchParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use tracing::{info, instrument};

use super::events::{map_watch_event, namespace_name, pod_observation, EventStream};
use super::ClusterApi;
use crate::error::{WatchdogError, WatchdogResult};
use crate::models::PodObservation;

/// Resource version asking the server to replay every existing object as Added first
const REPLAY_FROM_START: &str = "0";

/// Wrapper around kube::Client implementing the cluster capabilities
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    /// Create a client from an explicit kubeconfig path, or infer in-cluster / default config
    #[instrument(skip_all)]
    pub async fn new(kubeconfig: Option<&str>) -> WatchdogResult<Self> {
        let config = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
            }
            None => Config::infer().await?,
        };
        let client = Client::try_from(config)?;

        info!("Kubernetes client created");

        Ok(Self { client })
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Check if cluster is reachable
    pub async fn health_check(&self) -> WatchdogResult<String> {
        let version = self.client.apiserver_version().await?;
        info!(version = %version.git_version, "Kubernetes cluster is reachable");
        Ok(version.git_version)
    }
}

#[async_trait]
impl ClusterApi for K8sClient {
    async fn watch_namespaces(&self) -> WatchdogResult<EventStream<String>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let stream = namespaces
            .watch(&WatchParams::default(), REPLAY_FROM_START)
            .await
            .map_err(|e| WatchdogError::watch_open("namespaces", e))?;

        Ok(stream
            .filter_map(|event| future::ready(map_watch_event(event, namespace_name)))
            .boxed())
    }

    async fn watch_pods(&self, namespace: &str) -> WatchdogResult<EventStream<PodObservation>> {
        let stream = self
            .pods(namespace)
            .watch(&WatchParams::default(), REPLAY_FROM_START)
            .await
            .map_err(|e| WatchdogError::watch_open(format!("pods in {}", namespace), e))?;

        Ok(stream
            .filter_map(|event| future::ready(map_watch_event(event, pod_observation)))
            .boxed())
    }

    #[instrument(skip(self))]
    async fn delete_pod(
        &self,
        namespace: &str,
        name: &str,
        grace_period_seconds: u32,
    ) -> WatchdogResult<()> {
        let params = DeleteParams {
            grace_period_seconds: Some(grace_period_seconds),
            ..Default::default()
        };

        self.pods(namespace)
            .delete(name, &params)
            .await
            .map_err(|e| WatchdogError::delete_failed(namespace, name, e))?;

        info!(namespace, pod = name, "Deleted pod");
        Ok(())
    }
}
