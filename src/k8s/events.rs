//! Translation of raw kube watch events into watchdog events

use futures::stream::BoxStream;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::WatchEvent;

use crate::models::{ConditionStatus, PodCondition, PodObservation, PodPhase};

/// Lifecycle event of a watched resource
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent<T> {
    Added(T),
    Modified(T),
    Deleted(T),
    /// Server-side error on the watch; the subscriber must resubscribe
    Error(String),
    /// Payload that could not be understood; ignored by subscribers
    Malformed(String),
}

pub type EventStream<T> = BoxStream<'static, ResourceEvent<T>>;

/// Map one item of a kube watch stream. Bookmarks carry nothing for us and yield `None`.
pub fn map_watch_event<K, T>(
    event: kube::Result<WatchEvent<K>>,
    convert: impl Fn(K) -> Result<T, String>,
) -> Option<ResourceEvent<T>> {
    let wrap = |object: K, build: fn(T) -> ResourceEvent<T>| match convert(object) {
        Ok(value) => build(value),
        Err(reason) => ResourceEvent::Malformed(reason),
    };

    match event {
        Ok(WatchEvent::Added(object)) => Some(wrap(object, ResourceEvent::Added)),
        Ok(WatchEvent::Modified(object)) => Some(wrap(object, ResourceEvent::Modified)),
        Ok(WatchEvent::Deleted(object)) => Some(wrap(object, ResourceEvent::Deleted)),
        Ok(WatchEvent::Bookmark(_)) => None,
        Ok(WatchEvent::Error(response)) => Some(ResourceEvent::Error(format!(
            "{} ({})",
            response.message, response.code
        ))),
        Err(e) => Some(ResourceEvent::Error(e.to_string())),
    }
}

pub fn namespace_name(namespace: Namespace) -> Result<String, String> {
    namespace
        .metadata
        .name
        .ok_or_else(|| "namespace event without a name".to_string())
}

/// Keep only the health-relevant parts of a pod
pub fn pod_observation(pod: Pod) -> Result<PodObservation, String> {
    let name = pod
        .metadata
        .name
        .ok_or_else(|| "pod event without a name".to_string())?;

    let status = pod.status.unwrap_or_default();
    let phase = status
        .phase
        .as_deref()
        .map(PodPhase::from)
        .unwrap_or(PodPhase::Unknown);
    let conditions = status
        .conditions
        .unwrap_or_default()
        .into_iter()
        .map(|c| PodCondition::new(c.type_, ConditionStatus::from(c.status.as_str())))
        .collect();

    Ok(PodObservation::new(name, phase, conditions))
}
