//! Notifications emitted to tracker observers.
//!
//! Every state change seen by [`crate::service::TrackerService`] is
//! published as a [`TrackerEvent`] through the [`super::EventBus`] so a
//! presentation layer can render it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Position;

/// Observable tracker event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// A session opened or went away.
    ConnectivityChanged {
        /// New connectivity value.
        connected: bool,
        /// Local time of the change.
        timestamp: DateTime<Utc>,
    },

    /// A position was accepted and containment re-evaluated.
    PositionUpdated {
        /// The accepted position.
        position: Position,
        /// Whether it lies inside the boundary geometry.
        contained: bool,
        /// Local time of arrival.
        timestamp: DateTime<Utc>,
    },

    /// A frame could not be decoded. The session stays open.
    DecodeFailed {
        /// Human-readable reason.
        message: String,
        /// Local time of the failure.
        timestamp: DateTime<Utc>,
    },

    /// A session failed to open or was lost.
    SessionFailed {
        /// Human-readable reason.
        message: String,
        /// Local time of the failure.
        timestamp: DateTime<Utc>,
    },
}

impl TrackerEvent {
    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ConnectivityChanged { .. } => "connectivity_changed",
            Self::PositionUpdated { .. } => "position_updated",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::SessionFailed { .. } => "session_failed",
        }
    }
}
