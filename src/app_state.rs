//! Shared publisher state injected into all Axum handlers.

use std::sync::Arc;

use crate::publisher::PositionHub;

/// Shared state available to all publisher handlers via Axum's `State`
/// extractor.
#[derive(Debug, Clone)]
pub struct PublisherState {
    /// Frame fan-out and subscriber registry.
    pub hub: Arc<PositionHub>,
}

impl PublisherState {
    /// Creates state around an existing hub.
    #[must_use]
    pub fn new(hub: Arc<PositionHub>) -> Self {
        Self { hub }
    }
}
