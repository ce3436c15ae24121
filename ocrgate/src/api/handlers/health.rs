use axum::{extract::State, Json};

use crate::api::dto::{HealthResponse, RootResponse};
use crate::api::state::AppState;

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service identity", body = RootResponse),
    )
)]
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    tracing::info!("Health check request received");
    Json(RootResponse {
        message: "OCR API is running".to_string(),
        name: state.config.app.name.clone(),
        version: state.config.app.version.clone(),
    })
}

/// `GET /health`
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    tracing::debug!("Health check endpoint called");
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
