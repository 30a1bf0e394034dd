use axum::{extract::State, response::IntoResponse};

use crate::api::AppState;

/// Prometheus metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = match &state.prometheus {
        Some(handle) => handle.render(),
        // No recorder installed (tests, embedding): expose the in-process total only
        None => format!(
            "# HELP {name} The total number of times a pod has been killed by the watchdog\n\
             # TYPE {name} counter\n\
             {name} {value}\n",
            name = crate::telemetry::PODS_KILLED_TOTAL,
            value = state.metrics.kills_total()
        ),
    };

    ([("content-type", "text/plain; version=0.0.4")], body)
}
