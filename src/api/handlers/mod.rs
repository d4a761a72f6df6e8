//! REST endpoint handlers.

pub mod system;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::app_state::PublisherState;

/// OpenAPI document for the publisher's REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "position-publisher"),
    paths(system::health_handler, system::status_handler),
    components(schemas(system::HealthResponse, system::StatusResponse))
)]
pub struct ApiDoc;

/// `GET /api-docs/openapi.json` — OpenAPI document.
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<PublisherState> {
    Router::new().route("/status", get(system::status_handler))
}
