//! Wire message envelope and the typed events decoded from it.

use serde::{Deserialize, Serialize};

use crate::domain::Position;

/// Event name carrying a [`Position`] payload.
pub const POSITION_UPDATE: &str = "position_update";

/// Event name sent once by the publisher after a session is accepted.
pub const CONNECTED: &str = "connected";

/// Top-level wire envelope: `{"event": string, "data": <event-specific>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Event discriminator.
    pub event: String,
    /// Event-specific payload; `null` when absent.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WireMessage {
    /// Builds a `position_update` envelope.
    #[must_use]
    pub fn position_update(position: &Position) -> Self {
        Self {
            event: POSITION_UPDATE.to_string(),
            data: serde_json::json!({
                "x": position.x,
                "y": position.y,
                "timestamp": position.timestamp,
            }),
        }
    }

    /// Builds a `connected` envelope with an informational message.
    #[must_use]
    pub fn connected(message: &str) -> Self {
        Self {
            event: CONNECTED.to_string(),
            data: serde_json::json!({ "message": message }),
        }
    }
}

/// Typed inbound event produced by [`super::MessageDecoder`].
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A new position for the tracked agent.
    PositionUpdate(Position),
    /// Informational greeting from the publisher. Not stored.
    Connected {
        /// Greeting text, when the payload carried one.
        message: Option<String>,
    },
    /// An event this tracker does not know. Ignored.
    Other {
        /// The unrecognized event name.
        event: String,
    },
}
