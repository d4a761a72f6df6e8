//! Observer interface the session state machine reports to.

use std::fmt;

use crate::domain::Position;
use crate::error::{DecodeError, TrackerError};

/// Receives notifications from a [`super::ConnectionManager`].
///
/// Callbacks run synchronously while the manager holds its state lock, in
/// frame arrival order. Implementations must not call back into the
/// manager and must not block.
pub trait SessionObserver: Send + Sync + fmt::Debug {
    /// A session opened (`true`) or an open session was lost (`false`).
    fn on_connectivity(&self, connected: bool);

    /// A `position_update` frame was decoded and accepted.
    fn on_position(&self, position: Position);

    /// A frame could not be decoded. The session stays open.
    fn on_decode_error(&self, error: &DecodeError);

    /// A session failed to open or was lost; a reconnect is scheduled.
    fn on_session_error(&self, error: &TrackerError);
}
