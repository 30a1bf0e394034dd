use serde::Deserialize;
use std::time::Duration;

use crate::error::WatchdogResult;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Regex a namespace name must match to be watched; empty matches everything
    #[serde(default)]
    pub filter_namespaces: String,

    /// How long, in minutes, a namespace must stay in the same unhealthy state before retaliating
    #[serde(default = "default_grace_period_min")]
    pub retaliate_grace_period_min: u64,

    /// Only log the pods that would have been killed
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub verbose: bool,

    /// Explicit kubeconfig file. KUBECONFIG itself is left to the client's own
    /// inference, which understands path lists.
    #[serde(default)]
    pub kubeconfig_path: Option<String>,

    #[serde(default = "default_liveness_interval_secs")]
    pub liveness_interval_secs: u64,

    #[serde(default = "default_watch_retry_initial_ms")]
    pub watch_retry_initial_ms: u64,

    #[serde(default = "default_watch_retry_max_ms")]
    pub watch_retry_max_ms: u64,

    #[serde(default = "default_monitor_shutdown_timeout_secs")]
    pub monitor_shutdown_timeout_secs: u64,

    /// gracePeriodSeconds sent with the pod deletion; 0 kills immediately
    #[serde(default)]
    pub kill_grace_period_seconds: u32,
}

fn default_port() -> u16 {
    8080
}

fn default_grace_period_min() -> u64 {
    10
}

fn default_liveness_interval_secs() -> u64 {
    60
}

fn default_watch_retry_initial_ms() -> u64 {
    500
}

fn default_watch_retry_max_ms() -> u64 {
    30_000
}

fn default_monitor_shutdown_timeout_secs() -> u64 {
    5
}

impl Config {
    pub fn load() -> WatchdogResult<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let source = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Self::from_source(source)
    }

    pub fn from_source(source: config::Config) -> WatchdogResult<Self> {
        Ok(source.try_deserialize()?)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.retaliate_grace_period_min * 60)
    }

    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs)
    }

    pub fn watch_retry_initial(&self) -> Duration {
        Duration::from_millis(self.watch_retry_initial_ms)
    }

    pub fn watch_retry_max(&self) -> Duration {
        Duration::from_millis(self.watch_retry_max_ms)
    }

    pub fn monitor_shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.monitor_shutdown_timeout_secs)
    }

    /// Log filter used when RUST_LOG is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            filter_namespaces: String::new(),
            retaliate_grace_period_min: default_grace_period_min(),
            dry_run: false,
            verbose: false,
            kubeconfig_path: None,
            liveness_interval_secs: default_liveness_interval_secs(),
            watch_retry_initial_ms: default_watch_retry_initial_ms(),
            watch_retry_max_ms: default_watch_retry_max_ms(),
            monitor_shutdown_timeout_secs: default_monitor_shutdown_timeout_secs(),
            kill_grace_period_seconds: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.filter_namespaces, "");
        assert_eq!(config.grace_period(), Duration::from_secs(600));
        assert_eq!(config.liveness_interval(), Duration::from_secs(60));
        assert!(!config.dry_run);
        assert_eq!(config.default_log_filter(), "info");
    }

    #[test]
    fn test_from_source_overrides() {
        let source = config::Config::builder()
            .set_override("dry_run", true)
            .unwrap()
            .set_override("filter_namespaces", "mem|couch")
            .unwrap()
            .set_override("retaliate_grace_period_min", 3)
            .unwrap()
            .set_override("verbose", true)
            .unwrap()
            .build()
            .unwrap();

        let config = Config::from_source(source).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.filter_namespaces, "mem|couch");
        assert_eq!(config.grace_period(), Duration::from_secs(180));
        assert_eq!(config.default_log_filter(), "debug");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_kubeconfig_list_is_left_to_inference() {
        let source = config::Config::builder()
            .set_override("kubeconfig", "/etc/kube/config:/home/me/.kube/other")
            .unwrap()
            .build()
            .unwrap();

        let config = Config::from_source(source).unwrap();
        assert_eq!(config.kubeconfig_path, None);
    }

    #[test]
    fn test_kubeconfig_path_override() {
        let source = config::Config::builder()
            .set_override("kubeconfig_path", "/etc/kube/config")
            .unwrap()
            .build()
            .unwrap();

        let config = Config::from_source(source).unwrap();
        assert_eq!(config.kubeconfig_path.as_deref(), Some("/etc/kube/config"));
    }

    #[test]
    fn test_from_source_rejects_bad_types() {
        let source = config::Config::builder()
            .set_override("port", "not-a-port")
            .unwrap()
            .build()
            .unwrap();

        assert!(Config::from_source(source).is_err());
    }
}
