//! Namespace status endpoints

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::api::response::ApiResponse;
use crate::api::AppState;

/// List the status of every monitored namespace
pub async fn list(State(state): State<AppState>) -> Response {
    ApiResponse::success(state.status.list().await).into_response()
}

/// Status of a single monitored namespace
pub async fn get(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.status.get(&name).await {
        Some(status) => ApiResponse::success(status).into_response(),
        None => ApiResponse::error("NOT_FOUND", format!("Namespace '{}' is not monitored", name))
            .into_response(),
    }
}
