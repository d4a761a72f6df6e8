//! Lifecycle states of the transport session.

use std::fmt;

/// State of the single logical session owned by a
/// [`crate::ws::ConnectionManager`].
///
/// ```text
///              start()                 established
/// Disconnected ───────▶ Connecting ─────────────────▶ Open
///      ▲                  ▲    │                        │
///      │ stop()     delay │    │ failed        closed / │
///      │                  │    ▼               error    │
///      └──────────── ReconnectScheduled ◀───────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No session and no pending attempt.
    #[default]
    Disconnected,
    /// A session is being established.
    Connecting,
    /// A session is live and frames are being processed.
    Open,
    /// The last session failed; a single timer will start the next attempt.
    ReconnectScheduled,
}

impl ConnectionState {
    /// Returns `true` while a session is being established or is live.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }

    /// Returns the state as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::ReconnectScheduled => "reconnect_scheduled",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
