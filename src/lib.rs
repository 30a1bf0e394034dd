//! PodWarden Library
//!
//! Self-healing watchdog for Kubernetes workloads: every eligible namespace gets a
//! monitor tracking pod readiness, and a single stuck pod is deleted once the
//! namespace has stayed unhealthy for a whole grace period.

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod k8s;
pub mod models;
pub mod retaliation;
pub mod telemetry;
pub mod watchdog;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::api::AppState;

/// Create the application router with the given state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Metrics (Prometheus)
        .route("/metrics", get(api::metrics::metrics_handler))
        // Namespace status
        .route("/api/namespaces", get(api::namespaces::list))
        .route("/api/namespaces/:name", get(api::namespaces::get))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
