//! Namespace lifecycle watcher
//!
//! - On connect the API sends an Added event for every existing namespace
//! - Only Added and Deleted matter, i.e. creation and deletion of a watched namespace
//! - A resubscription replays Added for namespaces already tracked; those are no-ops

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::backoff::Backoff;
use super::filter::NamespaceFilter;
use super::monitor::{MonitorSettings, NamespaceContext, NamespaceMonitor};
use super::registry::{MonitorHandle, NamespaceRegistry};
use super::status::StatusBoard;
use crate::k8s::{ClusterApi, EventStream, ResourceEvent};
use crate::retaliation::PodKiller;
use crate::telemetry::MetricsSink;

/// Root worker: starts one [`NamespaceMonitor`] per eligible namespace and stops it
/// when the namespace goes away.
pub struct NamespaceSupervisor<C> {
    api: Arc<C>,
    filter: NamespaceFilter,
    settings: MonitorSettings,
    killer: Arc<dyn PodKiller>,
    metrics: Arc<dyn MetricsSink>,
    status: StatusBoard,
    registry: NamespaceRegistry,
    shutdown_timeout: Duration,
}

impl<C: ClusterApi> NamespaceSupervisor<C> {
    pub fn new(
        api: Arc<C>,
        filter: NamespaceFilter,
        settings: MonitorSettings,
        killer: Arc<dyn PodKiller>,
        metrics: Arc<dyn MetricsSink>,
        status: StatusBoard,
    ) -> Self {
        Self {
            api,
            filter,
            settings,
            killer,
            metrics,
            status,
            registry: NamespaceRegistry::new(),
            shutdown_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Watch namespaces until `shutdown` fires, then stop every monitor and wait for them
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(filter = %self.filter.as_str(), "Starting namespace supervisor");
        let mut backoff = self.settings.backoff();

        let mut namespaces = match self.subscribe(&shutdown, &mut backoff, false).await {
            Some(stream) => stream,
            None => {
                info!("Namespace supervisor stopped before the watch was established");
                return;
            }
        };

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                event = namespaces.next() => match event {
                    Some(ResourceEvent::Error(reason)) => {
                        error!(reason = %reason, "Namespace watch failed, restarting watcher");
                        match self.subscribe(&shutdown, &mut backoff, true).await {
                            Some(stream) => namespaces = stream,
                            None => break,
                        }
                    }
                    None => {
                        error!("Namespace watch closed, restarting watcher");
                        match self.subscribe(&shutdown, &mut backoff, true).await {
                            Some(stream) => namespaces = stream,
                            None => break,
                        }
                    }
                    Some(event) => {
                        backoff.reset();
                        self.handle_event(event, &shutdown).await;
                    }
                },
            }

            for namespace in self.registry.reap_finished() {
                self.status.remove(&namespace).await;
            }
        }

        self.stop_all().await;
        info!("Namespace supervisor stopped");
    }

    /// Apply one namespace lifecycle event to the registry
    pub async fn handle_event(&mut self, event: ResourceEvent<String>, shutdown: &CancellationToken) {
        match event {
            ResourceEvent::Added(namespace) => {
                debug!(namespace = %namespace, "Namespace added");

                if !self.filter.matches(&namespace) {
                    debug!(namespace = %namespace, "Namespace does not match the filter, ignoring");
                    return;
                }

                // A restarted watch replays Added for every namespace; never spawn twice
                if self.registry.contains(&namespace) {
                    return;
                }

                self.start_monitor(namespace, shutdown.child_token());
            }
            ResourceEvent::Deleted(namespace) => {
                debug!(namespace = %namespace, "Namespace deleted");

                if let Some(handle) = self.registry.remove(&namespace) {
                    self.stop_monitor(&namespace, handle).await;
                    self.status.remove(&namespace).await;
                }
            }
            ResourceEvent::Modified(namespace) => {
                debug!(namespace = %namespace, "Namespace modified, ignoring");
            }
            ResourceEvent::Malformed(reason) => {
                warn!(reason = %reason, "Ignoring malformed namespace event");
            }
            ResourceEvent::Error(reason) => {
                error!(reason = %reason, "Namespace watch error");
            }
        }
    }

    fn start_monitor(&mut self, namespace: String, cancel: CancellationToken) {
        info!(namespace = %namespace, "Starting monitor");

        let ctx = NamespaceContext::new(
            namespace.clone(),
            self.settings.grace_period,
            self.killer.clone(),
            self.metrics.clone(),
            cancel.clone(),
        );
        let monitor = NamespaceMonitor::new(
            self.api.clone(),
            ctx,
            self.settings.clone(),
            self.status.clone(),
        );

        let task = tokio::spawn(monitor.run());
        self.registry.insert(namespace, MonitorHandle::new(cancel, task));
    }

    async fn stop_monitor(&self, namespace: &str, handle: MonitorHandle) {
        info!(namespace, "Stopping monitor");
        if !handle.stop(self.shutdown_timeout).await {
            warn!(namespace, "Monitor did not acknowledge the stop signal in time, aborted");
        }
    }

    async fn stop_all(&mut self) {
        let monitors = self.registry.drain();
        info!(count = monitors.len(), "Stopping all monitors");

        let this = &*self;
        let stops = monitors.into_iter().map(|(namespace, handle)| async move {
            this.stop_monitor(&namespace, handle).await;
            namespace
        });
        for namespace in futures::future::join_all(stops).await {
            self.status.remove(&namespace).await;
        }
    }

    async fn subscribe(
        &self,
        shutdown: &CancellationToken,
        backoff: &mut Backoff,
        reconnecting: bool,
    ) -> Option<EventStream<String>> {
        let mut wait_first = reconnecting;

        loop {
            if wait_first {
                let delay = backoff.next_delay();
                tokio::select! {
                    _ = shutdown.cancelled() => return None,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            wait_first = true;

            tokio::select! {
                _ = shutdown.cancelled() => return None,
                result = self.api.watch_namespaces() => match result {
                    Ok(stream) => {
                        info!("Watching namespaces");
                        return Some(stream);
                    }
                    Err(e) => error!(error = %e, "Cannot watch namespaces, retrying"),
                },
            }
        }
    }
}
