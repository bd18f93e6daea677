use axum::{extract::State, http::StatusCode, response::{IntoResponse, Json}};

use crate::app::AppState;

/// HTTP handler for the `/healthz` endpoint.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let health_status = state.health_checker.check_health().await;

    if health_status.healthy {
        (StatusCode::OK, Json(health_status))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(health_status))
    }
}
