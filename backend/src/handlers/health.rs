//! Health check and fallback handlers

use axum::{extract::State, http::StatusCode, http::Uri, response::IntoResponse, Json};
use serde::Serialize;

use crate::error::ErrorResponse;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub database: String,
}

/// Root endpoint
pub async fn root() -> &'static str {
    "Clinic Pharmacy Management API"
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let health = &state.stores.health;
    let database = match health.ping().await {
        Ok(()) => "connected".to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "Store health check failed");
            "disconnected".to_string()
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: health.backend_name().to_string(),
        database,
    })
}

/// JSON 404 for unknown routes
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("NOT_FOUND", format!("Route {} not found", uri.path()))),
    )
}
