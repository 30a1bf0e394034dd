use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::killer::PodKiller;
use crate::error::WatchdogResult;
use crate::models::{ClusterState, PodObservation};
use crate::telemetry::MetricsSink;

/// Why no pod was killed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suppression {
    Healthy,
    /// The state has not been stable for the whole grace period yet
    CoolingDown { remaining: Duration },
    /// More than one pod is unhealthy: likely systemic, killing would start a spree
    Ambiguous { unhealthy: usize },
}

impl fmt::Display for Suppression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suppression::Healthy => write!(f, "namespace is healthy"),
            Suppression::CoolingDown { remaining } => {
                write!(f, "grace period not elapsed ({}s remaining)", remaining.as_secs())
            }
            Suppression::Ambiguous { unhealthy } => {
                write!(f, "{} pods unhealthy, doing nothing", unhealthy)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Suppress(Suppression),
    Kill(PodObservation),
}

/// Decide whether to kill a pod. Rules are checked in order: healthy, grace period,
/// more than one unhealthy pod, otherwise kill the single unhealthy pod.
pub fn decide(state: &ClusterState, grace_period: Duration, now: Instant) -> Decision {
    if state.is_healthy() {
        return Decision::Suppress(Suppression::Healthy);
    }

    let elapsed = now.saturating_duration_since(state.since);
    if elapsed < grace_period {
        return Decision::Suppress(Suppression::CoolingDown {
            remaining: grace_period - elapsed,
        });
    }

    let mut unhealthy = state.unhealthy_pods.values();
    match (unhealthy.next(), unhealthy.next()) {
        (Some(pod), None) => Decision::Kill(pod.clone()),
        _ => Decision::Suppress(Suppression::Ambiguous {
            unhealthy: state.unhealthy_pods.len(),
        }),
    }
}

/// Outcome of a retaliation cycle
#[derive(Debug)]
pub enum Retaliation {
    Suppressed(Suppression),
    /// A kill was attempted; a failed deletion does not undo the decision
    Executed {
        pod: String,
        result: WatchdogResult<()>,
    },
}

impl Retaliation {
    /// Whether an action was taken; the caller restarts the grace period when true
    pub fn acted(&self) -> bool {
        matches!(self, Retaliation::Executed { .. })
    }
}

/// Decide and, when warranted, kill the single unhealthy pod of `namespace`.
///
/// Deletion is not retried here: if the namespace stays unhealthy the next cycle
/// reconsiders once the grace period has elapsed again.
pub async fn retaliate(
    namespace: &str,
    state: &ClusterState,
    grace_period: Duration,
    now: Instant,
    killer: &dyn PodKiller,
    metrics: &dyn MetricsSink,
) -> Retaliation {
    let pod = match decide(state, grace_period, now) {
        Decision::Kill(pod) => pod,
        Decision::Suppress(reason) => {
            match reason {
                Suppression::Healthy => {}
                Suppression::CoolingDown { .. } => {
                    debug!(namespace, reason = %reason, "Retaliation suppressed")
                }
                Suppression::Ambiguous { .. } => {
                    info!(namespace, reason = %reason, "Retaliation suppressed")
                }
            }
            return Retaliation::Suppressed(reason);
        }
    };

    warn!(
        namespace,
        pod = %pod.name,
        phase = %pod.phase,
        "Grace period elapsed with a single unhealthy pod, retaliating"
    );
    metrics.pod_killed(namespace);

    let result = killer.kill(namespace, &pod.name, &pod).await;
    if let Err(e) = &result {
        error!(namespace, pod = %pod.name, error = %e, "Cannot kill pod");
    }

    Retaliation::Executed {
        pod: pod.name,
        result,
    }
}
