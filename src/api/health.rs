use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub dry_run: bool,
    pub watched_namespaces: usize,
    pub pods_killed: u64,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dry_run: state.config.dry_run,
        watched_namespaces: state.status.list().await.len(),
        pods_killed: state.metrics.kills_total(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::telemetry::PrometheusMetrics;
    use crate::watchdog::StatusBoard;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_check() {
        let state = AppState::new(
            Config::default(),
            StatusBoard::new(),
            Arc::new(PrometheusMetrics::new()),
        );
        let response = health_check(State(state)).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.watched_namespaces, 0);
        assert!(!response.dry_run);
    }
}
