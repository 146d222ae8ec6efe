//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    fn new(status: &str) -> Json<Self> {
        Json(Self {
            status: status.to_string(),
        })
    }
}

/// Liveness probe endpoint.
///
/// Returns 200 `{"status":"ok"}` while the process is serving.
pub async fn health_check() -> Json<StatusResponse> {
    StatusResponse::new("ok")
}

/// Readiness probe endpoint.
///
/// Returns 200 when the sensor store answers its connectivity probe,
/// 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    match state.sensor_service.store().ping().await {
        Ok(()) => (StatusCode::OK, StatusResponse::new("ready")),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                StatusResponse::new("unavailable"),
            )
        }
    }
}
