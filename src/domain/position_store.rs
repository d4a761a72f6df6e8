//! Single-writer cache of the latest accepted position and connectivity.
//!
//! [`PositionStore`] keeps exactly one [`Position`] (no history) plus the
//! connectivity flag and the last transient error string. Writes come only
//! from [`crate::service::TrackerService`]; any number of readers may take
//! snapshots.

use parking_lot::RwLock;
use serde::Serialize;

use super::Position;

/// Point-in-time copy of the store contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    /// Most recently accepted position, if any has arrived yet.
    pub position: Option<Position>,
    /// Whether a session is currently open.
    pub connected: bool,
    /// Last user-visible error, cleared when a session opens.
    pub last_error: Option<String>,
}

/// Holds the current position and connectivity status.
#[derive(Debug, Default)]
pub struct PositionStore {
    inner: RwLock<TrackerSnapshot>,
}

impl PositionStore {
    /// Creates an empty store: no position, disconnected, no error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored position unconditionally.
    ///
    /// No timestamp ordering is enforced: a late, older update overwrites a
    /// newer one.
    pub fn update(&self, position: Position) {
        self.inner.write().position = Some(position);
    }

    /// Updates connectivity. Becoming connected clears the last error.
    pub fn set_connected(&self, connected: bool) {
        let mut guard = self.inner.write();
        guard.connected = connected;
        if connected {
            guard.last_error = None;
        }
    }

    /// Records a transient, user-visible error message.
    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.write().last_error = Some(message.into());
    }

    /// Returns the current position, if any.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.inner.read().position
    }

    /// Returns `true` if a session is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.read().connected
    }

    /// Returns the last error message, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner.read().last_error.clone()
    }

    /// Returns a copy of the whole store.
    #[must_use]
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.inner.read().clone()
    }
}
