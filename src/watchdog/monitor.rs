//! Pod watcher of a single namespace
//!
//! Records the status of every pod of the namespace, re-evaluates the namespace
//! health after each event or liveness tick, and retaliates once the namespace has
//! been stuck in the same unhealthy state for the whole grace period.

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backoff::Backoff;
use super::status::{NamespaceStatus, StatusBoard};
use crate::health::{evaluate_cluster_state, PodTable};
use crate::k8s::{ClusterApi, EventStream, ResourceEvent};
use crate::models::{ClusterState, PodObservation};
use crate::retaliation::{retaliate, PodKiller, Retaliation};
use crate::telemetry::MetricsSink;

/// Settings shared by every monitor
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub grace_period: Duration,
    pub liveness_interval: Duration,
    pub retry_initial: Duration,
    pub retry_max: Duration,
}

impl MonitorSettings {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            grace_period: config.grace_period(),
            liveness_interval: config.liveness_interval(),
            retry_initial: config.watch_retry_initial(),
            retry_max: config.watch_retry_max(),
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.retry_initial, self.retry_max)
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from_config(&crate::config::Config::default())
    }
}

/// Everything needed to watch one namespace over time.
/// The pod table and state are only touched by the namespace's own monitor task.
pub struct NamespaceContext {
    pub namespace: String,
    pub pods: PodTable,
    pub state: ClusterState,
    pub grace_period: Duration,
    pub killer: Arc<dyn PodKiller>,
    pub metrics: Arc<dyn MetricsSink>,
    pub cancel: CancellationToken,
    /// Pods killed in this namespace
    pub kills: u64,
}

impl NamespaceContext {
    pub fn new(
        namespace: impl Into<String>,
        grace_period: Duration,
        killer: Arc<dyn PodKiller>,
        metrics: Arc<dyn MetricsSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            pods: PodTable::new(),
            state: ClusterState::healthy(Instant::now()),
            grace_period,
            killer,
            metrics,
            cancel,
            kills: 0,
        }
    }

    /// Record a pod lifecycle event. Added and Modified upsert, Deleted removes.
    pub fn apply_pod_event(&mut self, event: ResourceEvent<PodObservation>) {
        match event {
            ResourceEvent::Added(pod) | ResourceEvent::Modified(pod) => {
                info!(namespace = %self.namespace, pod = %pod.name, phase = %pod.phase, "Pod updated");
                self.pods.insert(pod.name.clone(), pod);
            }
            ResourceEvent::Deleted(pod) => {
                info!(namespace = %self.namespace, pod = %pod.name, "Pod deleted");
                self.pods.remove(&pod.name);
            }
            ResourceEvent::Malformed(reason) => {
                warn!(namespace = %self.namespace, reason = %reason, "Ignoring malformed pod event");
            }
            ResourceEvent::Error(reason) => {
                warn!(namespace = %self.namespace, reason = %reason, "Pod watch error");
            }
        }
    }

    /// Re-evaluate the namespace and adopt the result only on a material change.
    /// Returns whether the stored state changed.
    pub fn update_cluster_state(&mut self, now: Instant) -> bool {
        let candidate = evaluate_cluster_state(&self.pods, now);
        let changed = self.state.merge(candidate);

        if changed {
            info!(
                namespace = %self.namespace,
                health = %self.state.health,
                unhealthy = ?self.state.unhealthy_names(),
                "Cluster state changed"
            );
        } else {
            debug!(namespace = %self.namespace, health = %self.state.health, "Cluster state unchanged");
        }

        changed
    }

    /// One evaluation cycle: update the state, retaliate if warranted, and restart the
    /// grace period clock after an action so the next kill needs a full grace period again.
    pub async fn run_cycle(&mut self, now: Instant) -> Retaliation {
        self.update_cluster_state(now);

        let outcome = retaliate(
            &self.namespace,
            &self.state,
            self.grace_period,
            now,
            self.killer.as_ref(),
            self.metrics.as_ref(),
        )
        .await;

        if outcome.acted() {
            self.kills += 1;
            self.state.reset_since(now);
        }

        outcome
    }

    pub fn status(&self, now: Instant) -> NamespaceStatus {
        NamespaceStatus::from_state(&self.namespace, &self.state, self.pods.len(), self.kills, now)
    }
}

/// Worker owning one [`NamespaceContext`] and its pod watch stream
pub struct NamespaceMonitor<C> {
    api: Arc<C>,
    ctx: NamespaceContext,
    settings: MonitorSettings,
    status: StatusBoard,
}

impl<C: ClusterApi> NamespaceMonitor<C> {
    pub fn new(
        api: Arc<C>,
        ctx: NamespaceContext,
        settings: MonitorSettings,
        status: StatusBoard,
    ) -> Self {
        Self {
            api,
            ctx,
            settings,
            status,
        }
    }

    /// Run until the context's cancellation token fires
    pub async fn run(mut self) {
        let mut backoff = self.settings.backoff();

        let Some(mut pods) = self.subscribe(&mut backoff, false).await else {
            info!(namespace = %self.ctx.namespace, "Stopped before the pod watch was established");
            return;
        };
        info!(namespace = %self.ctx.namespace, "Starting to watch pods");
        self.publish().await;

        let period = self.settings.liveness_interval;
        let mut liveness = interval_at(Instant::now() + period, period);
        liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.ctx.cancel.cancelled() => {
                    info!(namespace = %self.ctx.namespace, "Notified to stop, stopping the pod watch");
                    break;
                }

                // Forces a check even when the pods are quiet and the namespace is unhealthy
                _ = liveness.tick() => {
                    debug!(namespace = %self.ctx.namespace, "Liveness tick");
                }

                event = pods.next() => match event {
                    Some(ResourceEvent::Error(reason)) => {
                        warn!(namespace = %self.ctx.namespace, reason = %reason, "Pod watch failed, resubscribing");
                        match self.subscribe(&mut backoff, true).await {
                            Some(stream) => pods = stream,
                            None => break,
                        }
                    }
                    None => {
                        warn!(namespace = %self.ctx.namespace, "Pod watch closed, resubscribing");
                        match self.subscribe(&mut backoff, true).await {
                            Some(stream) => pods = stream,
                            None => break,
                        }
                    }
                    Some(event) => {
                        backoff.reset();
                        self.ctx.apply_pod_event(event);
                    }
                },
            }

            self.ctx.run_cycle(Instant::now()).await;
            self.publish().await;
        }

        info!(namespace = %self.ctx.namespace, kills = self.ctx.kills, "Monitor stopped");
    }

    /// Open the pod watch, retrying with backoff. Returns `None` once cancelled,
    /// which is observed while waiting on the API as well as while backing off.
    async fn subscribe(
        &self,
        backoff: &mut Backoff,
        reconnecting: bool,
    ) -> Option<EventStream<PodObservation>> {
        let mut wait_first = reconnecting;

        loop {
            if wait_first {
                let delay = backoff.next_delay();
                tokio::select! {
                    _ = self.ctx.cancel.cancelled() => return None,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            wait_first = true;

            tokio::select! {
                _ = self.ctx.cancel.cancelled() => return None,
                result = self.api.watch_pods(&self.ctx.namespace) => match result {
                    Ok(stream) => return Some(stream),
                    Err(e) => {
                        warn!(namespace = %self.ctx.namespace, error = %e, "Cannot watch pods, retrying");
                    }
                },
            }
        }
    }

    async fn publish(&self) {
        self.status.publish(self.ctx.status(Instant::now())).await;
    }
}
