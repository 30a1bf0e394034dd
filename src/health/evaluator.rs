use std::collections::{BTreeMap, HashMap};
use tokio::time::Instant;

use super::classifier::is_pod_healthy;
use crate::models::{ClusterState, PodObservation};

/// Last known observation of every pod in a namespace, keyed by pod name
pub type PodTable = HashMap<String, PodObservation>;

/// Compute a fresh [`ClusterState`] from the pod table, stamped with `now`.
///
/// Whether the stored state adopts it is the caller's decision (see [`ClusterState::merge`]).
pub fn evaluate_cluster_state(pods: &PodTable, now: Instant) -> ClusterState {
    let unhealthy_pods: BTreeMap<String, PodObservation> = pods
        .iter()
        .filter(|(_, pod)| !is_pod_healthy(pod))
        .map(|(name, pod)| (name.clone(), pod.clone()))
        .collect();

    ClusterState::new(unhealthy_pods, now)
}
