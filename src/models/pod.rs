//! Pod observations as tracked by a namespace monitor
//!
//! Only the parts of a pod's status that decide its health are kept:
//! the phase and the ordered list of conditions.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle phase reported by the kubelet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodPhase {
    fn from(phase: &str) -> Self {
        match phase {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// Tristate status of a pod condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl From<&str> for ConditionStatus {
    fn from(status: &str) -> Self {
        match status {
            "True" => ConditionStatus::True,
            "False" => ConditionStatus::False,
            _ => ConditionStatus::Unknown,
        }
    }
}

/// A named condition attached to a pod (PodScheduled, Initialized, ContainersReady, Ready, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodCondition {
    pub kind: String,
    pub status: ConditionStatus,
}

impl PodCondition {
    pub fn new(kind: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            kind: kind.into(),
            status,
        }
    }
}

/// Last known status of a single pod
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodObservation {
    pub name: String,
    pub phase: PodPhase,
    #[serde(default)]
    pub conditions: Vec<PodCondition>,
}

impl PodObservation {
    pub fn new(name: impl Into<String>, phase: PodPhase, conditions: Vec<PodCondition>) -> Self {
        Self {
            name: name.into(),
            phase,
            conditions,
        }
    }

    /// Whether phase and conditions are the same, ignoring the name
    pub fn same_status(&self, other: &PodObservation) -> bool {
        self.phase == other.phase && self.conditions == other.conditions
    }
}
