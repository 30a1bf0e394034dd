use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Cancellation token and completion handle of a running monitor
#[derive(Debug)]
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn new(cancel: CancellationToken, task: JoinHandle<()>) -> Self {
        Self { cancel, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the monitor and wait for it to exit. Aborts it if it does not
    /// acknowledge within `timeout`. Returns whether it exited on its own.
    pub async fn stop(self, timeout: Duration) -> bool {
        self.cancel.cancel();

        let mut task = self.task;
        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(error = %e, "Monitor task failed");
                true
            }
            Err(_) => {
                task.abort();
                false
            }
        }
    }
}

/// Namespace name to its running monitor. Mutated only by the supervisor.
#[derive(Debug, Default)]
pub struct NamespaceRegistry {
    monitors: HashMap<String, MonitorHandle>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.monitors.contains_key(namespace)
    }

    pub fn insert(&mut self, namespace: String, handle: MonitorHandle) {
        self.monitors.insert(namespace, handle);
    }

    pub fn remove(&mut self, namespace: &str) -> Option<MonitorHandle> {
        self.monitors.remove(namespace)
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<_> = self.monitors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop the entries of monitors that exited without being asked to
    pub fn reap_finished(&mut self) -> Vec<String> {
        let finished: Vec<String> = self
            .monitors
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(namespace, _)| namespace.clone())
            .collect();

        for namespace in &finished {
            self.monitors.remove(namespace);
            warn!(namespace = %namespace, "Monitor exited on its own, dropped from registry");
        }

        finished
    }

    pub fn drain(&mut self) -> Vec<(String, MonitorHandle)> {
        self.monitors.drain().collect()
    }
}
