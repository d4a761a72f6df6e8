//! Fan-out of position frames to connected subscribers.
//!
//! [`PositionHub`] wraps a [`tokio::sync::broadcast`] channel of encoded
//! frames plus the set of live connection ids, so the ticker can skip work
//! while nobody listens and `/api/status` can report the count.

use std::collections::HashSet;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::domain::{ConnectionId, Position};
use crate::ws::WireMessage;

/// Broadcast hub for encoded wire frames.
#[derive(Debug)]
pub struct PositionHub {
    sender: broadcast::Sender<String>,
    connections: Mutex<HashSet<ConnectionId>>,
}

impl PositionHub {
    /// Creates a hub with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            connections: Mutex::new(HashSet::new()),
        }
    }

    /// Registers a new subscriber and returns its id and frame receiver.
    pub fn register(&self) -> (ConnectionId, broadcast::Receiver<String>) {
        let id = ConnectionId::new();
        self.connections.lock().insert(id);
        (id, self.sender.subscribe())
    }

    /// Forgets a subscriber. Unknown ids are ignored.
    pub fn unregister(&self, id: ConnectionId) {
        self.connections.lock().remove(&id);
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Encodes and broadcasts a position.
    ///
    /// Returns the number of receivers reached; `0` when nobody listens.
    pub fn publish_position(&self, position: &Position) -> usize {
        match serde_json::to_string(&WireMessage::position_update(position)) {
            Ok(frame) => self.sender.send(frame).unwrap_or(0),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode position frame");
                0
            }
        }
    }
}
