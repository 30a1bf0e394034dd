//! Error types for the watchdog
//!
//! Only configuration and client construction errors are fatal; everything else is
//! logged and absorbed by the loop that hit it.

use thiserror::Error;

pub type WatchdogResult<T> = Result<T, WatchdogError>;

#[derive(Debug, Error)]
pub enum WatchdogError {
    #[error("invalid namespace filter '{expression}': {source}")]
    InvalidFilter {
        expression: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("kubernetes client error: {0}")]
    Client(#[from] kube::Error),

    #[error("invalid kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("cannot infer kubernetes configuration: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    #[error("cannot watch {resource}: {reason}")]
    WatchOpen { resource: String, reason: String },

    #[error("cannot delete pod {namespace}/{pod}: {reason}")]
    DeleteFailed {
        namespace: String,
        pod: String,
        reason: String,
    },
}

impl WatchdogError {
    pub fn watch_open(resource: impl Into<String>, reason: impl ToString) -> Self {
        WatchdogError::WatchOpen {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    pub fn delete_failed(namespace: &str, pod: &str, reason: impl ToString) -> Self {
        WatchdogError::DeleteFailed {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error must stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WatchdogError::InvalidFilter { .. }
                | WatchdogError::Config(_)
                | WatchdogError::Client(_)
                | WatchdogError::Kubeconfig(_)
                | WatchdogError::InferConfig(_)
        )
    }
}
