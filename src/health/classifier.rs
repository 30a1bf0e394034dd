use crate::models::{ConditionStatus, PodObservation, PodPhase};

/// A pod is healthy when it is Running and every one of its conditions is True.
///
/// Conditions hold the startup steps (PodScheduled, Initialized, ContainersReady, Ready);
/// a single missing step means the pod is not fully functional. A Running pod with no
/// conditions at all is healthy.
pub fn is_pod_healthy(pod: &PodObservation) -> bool {
    if pod.phase != PodPhase::Running {
        return false;
    }

    pod.conditions
        .iter()
        .all(|condition| condition.status == ConditionStatus::True)
}
