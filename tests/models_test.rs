//! Tests for pod models and namespace health evaluation through the public API

use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;

use podwarden::health::{evaluate_cluster_state, is_pod_healthy, PodTable};
use podwarden::models::{ClusterHealth, ConditionStatus, PodCondition, PodObservation, PodPhase};

fn ready_conditions() -> Vec<PodCondition> {
    ["PodScheduled", "Initialized", "ContainersReady", "Ready"]
        .into_iter()
        .map(|kind| PodCondition::new(kind, ConditionStatus::True))
        .collect()
}

fn table(pods: Vec<PodObservation>) -> PodTable {
    pods.into_iter().map(|pod| (pod.name.clone(), pod)).collect()
}

#[test]
fn test_pod_observation_json() {
    let pod = PodObservation::new(
        "web-0",
        PodPhase::Running,
        vec![PodCondition::new("Ready", ConditionStatus::False)],
    );

    let value = serde_json::to_value(&pod).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "web-0",
            "phase": "Running",
            "conditions": [{"kind": "Ready", "status": "False"}]
        })
    );

    let parsed: PodObservation =
        serde_json::from_value(json!({"name": "web-1", "phase": "Pending"})).unwrap();
    assert!(parsed.conditions.is_empty());
    assert_eq!(parsed.phase, PodPhase::Pending);
}

#[test]
fn test_cluster_health_json() {
    assert_eq!(serde_json::to_value(ClusterHealth::Healthy).unwrap(), "HEALTHY");
    assert_eq!(ClusterHealth::Unhealthy.to_string(), "UNHEALTHY");
}

#[test]
fn test_rollout_scenario() {
    let t0 = Instant::now();
    let minute = Duration::from_secs(60);

    let mut pods = table(vec![
        PodObservation::new("web-0", PodPhase::Running, ready_conditions()),
        PodObservation::new("web-1", PodPhase::Running, vec![]),
    ]);
    let mut state = evaluate_cluster_state(&pods, t0);
    assert_eq!(state.health, ClusterHealth::Healthy);

    // A new replica cannot be scheduled
    let stuck = PodObservation::new(
        "web-2",
        PodPhase::Pending,
        vec![PodCondition::new("PodScheduled", ConditionStatus::False)],
    );
    assert!(!is_pod_healthy(&stuck));
    pods.insert(stuck.name.clone(), stuck);

    assert!(state.merge(evaluate_cluster_state(&pods, t0 + minute)));
    assert_eq!(state.health, ClusterHealth::Unhealthy);
    assert_eq!(state.unhealthy_names(), vec!["web-2".to_string()]);
    assert_eq!(state.since, t0 + minute);

    // Re-evaluating the same table later does not restart the clock
    assert!(!state.merge(evaluate_cluster_state(&pods, t0 + minute * 5)));
    assert_eq!(state.since, t0 + minute);

    // Its conditions move on, but it is still not ready
    pods.insert(
        "web-2".to_string(),
        PodObservation::new(
            "web-2",
            PodPhase::Running,
            vec![
                PodCondition::new("PodScheduled", ConditionStatus::True),
                PodCondition::new("Ready", ConditionStatus::False),
            ],
        ),
    );
    assert!(state.merge(evaluate_cluster_state(&pods, t0 + minute * 6)));
    assert_eq!(state.since, t0 + minute * 6);

    pods.remove("web-2");
    assert!(state.merge(evaluate_cluster_state(&pods, t0 + minute * 7)));
    assert!(state.is_healthy());
}
