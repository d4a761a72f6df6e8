//! System endpoints: health check and publisher status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::PublisherState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// RFC 3339 server time.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// Publisher status response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Always `"running"`.
    pub status: String,
    /// Number of connected WebSocket subscribers.
    pub connections: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /api/status` — Publisher status and subscriber count.
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "System",
    summary = "Publisher status",
    description = "Returns the number of connected position subscribers.",
    responses(
        (status = 200, description = "Publisher is running", body = StatusResponse),
    )
)]
pub async fn status_handler(State(state): State<PublisherState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "running".to_string(),
            connections: state.hub.connection_count(),
        }),
    )
}

/// System routes mounted at the root level (not under /api).
pub fn routes() -> Router<PublisherState> {
    Router::new().route("/health", get(health_handler))
}
