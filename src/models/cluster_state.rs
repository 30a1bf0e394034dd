//! Aggregate health of a namespace and the rule deciding when it changes

use serde::Serialize;
use std::collections::BTreeMap;
use strum::Display;
use tokio::time::Instant;

use super::pod::PodObservation;

/// High-level health of a namespace
#[derive(Debug, Clone, Copy, Serialize, Display, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ClusterHealth {
    Healthy,
    Unhealthy,
}

/// Health of a namespace together with the instant this exact state was first seen.
///
/// `since` only moves when the state changes materially (see [`ClusterState::differs_from`]),
/// so `now - since` is how long the namespace has been stuck in it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterState {
    pub health: ClusterHealth,
    pub unhealthy_pods: BTreeMap<String, PodObservation>,
    pub since: Instant,
}

impl ClusterState {
    /// Build a state from the unhealthy pods; health is derived from emptiness
    pub fn new(unhealthy_pods: BTreeMap<String, PodObservation>, since: Instant) -> Self {
        let health = if unhealthy_pods.is_empty() {
            ClusterHealth::Healthy
        } else {
            ClusterHealth::Unhealthy
        };

        Self {
            health,
            unhealthy_pods,
            since,
        }
    }

    pub fn healthy(since: Instant) -> Self {
        Self::new(BTreeMap::new(), since)
    }

    pub fn is_healthy(&self) -> bool {
        self.health == ClusterHealth::Healthy
    }

    /// True when `other` is a different state: health flipped, the set of unhealthy
    /// pods changed, or a pod unhealthy in both changed phase or conditions.
    pub fn differs_from(&self, other: &ClusterState) -> bool {
        if self.health != other.health {
            return true;
        }

        if self.unhealthy_pods.len() != other.unhealthy_pods.len() {
            return true;
        }

        self.unhealthy_pods.iter().any(|(name, pod)| {
            other
                .unhealthy_pods
                .get(name)
                .map_or(true, |candidate| !candidate.same_status(pod))
        })
    }

    /// Adopt `candidate` only if it differs materially. Returns whether the state was replaced.
    pub fn merge(&mut self, candidate: ClusterState) -> bool {
        if self.differs_from(&candidate) {
            *self = candidate;
            true
        } else {
            false
        }
    }

    /// Restart the grace period clock without touching the state itself
    pub fn reset_since(&mut self, now: Instant) {
        self.since = now;
    }

    pub fn unhealthy_names(&self) -> Vec<String> {
        self.unhealthy_pods.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConditionStatus, PodCondition, PodPhase};
    use std::time::Duration;

    fn state(pods: &[PodObservation], since: Instant) -> ClusterState {
        ClusterState::new(
            pods.iter().map(|p| (p.name.clone(), p.clone())).collect(),
            since,
        )
    }

    #[test]
    fn test_health_derived_from_unhealthy_pods() {
        let now = Instant::now();
        assert_eq!(ClusterState::healthy(now).health, ClusterHealth::Healthy);

        let pending = PodObservation::new("p1", PodPhase::Pending, vec![]);
        assert_eq!(state(&[pending], now).health, ClusterHealth::Unhealthy);
    }

    #[test]
    fn test_health_display() {
        assert_eq!(ClusterHealth::Healthy.to_string(), "HEALTHY");
        assert_eq!(ClusterHealth::Unhealthy.to_string(), "UNHEALTHY");
    }

    #[test]
    fn test_merge_keeps_since_when_unchanged() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(30);
        let pod = PodObservation::new("p1", PodPhase::Pending, vec![]);

        let mut current = state(&[pod.clone()], t0);
        assert!(!current.merge(state(&[pod], t1)));
        assert_eq!(current.since, t0);

        let mut healthy = ClusterState::healthy(t0);
        assert!(!healthy.merge(ClusterState::healthy(t1)));
        assert_eq!(healthy.since, t0);
    }

    #[test]
    fn test_merge_replaces_on_membership_change() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(30);
        let p1 = PodObservation::new("p1", PodPhase::Pending, vec![]);
        let p2 = PodObservation::new("p2", PodPhase::Pending, vec![]);

        let mut current = state(&[p1.clone()], t0);
        assert!(current.merge(state(&[p2], t1)));
        assert_eq!(current.since, t1);
        assert!(current.unhealthy_pods.contains_key("p2"));
    }

    #[test]
    fn test_merge_replaces_on_condition_change() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(30);
        let scheduled = PodObservation::new(
            "p1",
            PodPhase::Running,
            vec![PodCondition::new("PodScheduled", ConditionStatus::False)],
        );
        let ready = PodObservation::new(
            "p1",
            PodPhase::Running,
            vec![
                PodCondition::new("PodScheduled", ConditionStatus::True),
                PodCondition::new("Ready", ConditionStatus::False),
            ],
        );

        let mut current = state(&[scheduled], t0);
        assert!(current.merge(state(&[ready], t1)));
        assert_eq!(current.since, t1);
    }

    #[test]
    fn test_merge_replaces_on_health_flip() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(30);
        let pod = PodObservation::new("p1", PodPhase::Failed, vec![]);

        let mut current = state(&[pod], t0);
        assert!(current.merge(ClusterState::healthy(t1)));
        assert!(current.is_healthy());
        assert_eq!(current.since, t1);
    }
}
