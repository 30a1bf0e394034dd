//! Pod and namespace health evaluation
//!
//! - [`is_pod_healthy`] classifies a single pod
//! - [`evaluate_cluster_state`] aggregates a whole pod table into a [`ClusterState`]
//!
//! [`ClusterState`]: crate::models::ClusterState

mod classifier;
mod evaluator;

pub use classifier::is_pod_healthy;
pub use evaluator::{evaluate_cluster_state, PodTable};
