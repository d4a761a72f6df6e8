//! REST API layer of the development publisher.
//!
//! Status endpoints are mounted under `/api`, health at the root.

pub mod handlers;

use axum::Router;
use axum::routing::get;

use crate::app_state::PublisherState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<PublisherState> {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes())
        .route("/api-docs/openapi.json", get(handlers::openapi_handler))
}
