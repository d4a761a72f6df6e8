//! Development position publisher.
//!
//! Serves the wire protocol the tracker consumes so the client can be run
//! and tested end to end without the production publisher:
//!
//! ```text
//! ticker ──▶ PositionHub ──▶ run_connection (one per subscriber) ──▶ WebSocket
//!   ▲
//!   └── PositionGenerator
//! ```

pub mod connection;
pub mod generator;
pub mod handler;
pub mod hub;
pub mod ticker;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::PublisherState;

pub use generator::{PositionGenerator, RandomGenerator};
pub use hub::PositionHub;
pub use ticker::spawn_ticker;

/// Path of the WebSocket endpoint.
pub const WS_PATH: &str = "/api/ws/robot";

/// Builds the full publisher router: REST routes plus the WebSocket.
pub fn build_app(state: PublisherState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route(WS_PATH, get(handler::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
