//! Health check routes.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Liveness payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

/// Liveness check.
///
/// GET /api/health
///
/// Does not touch any dependency.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "EcoStore API is running",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness check.
///
/// GET /api/health/ready
///
/// Verifies database connectivity; 503 when the database is unreachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
