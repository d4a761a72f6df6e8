//! Tracker error types.
//!
//! [`DecodeError`] covers everything that can go wrong turning one inbound
//! frame into a typed event. [`TrackerError`] is the crate-wide error type.
//! None of these are fatal to the process: decode failures are recovered
//! locally and transport failures feed the reconnect state machine.

/// Failure to turn a raw text frame into a typed inbound event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The frame was not valid JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// The frame was a JSON value but had no string `event` field.
    #[error("missing event field")]
    MissingEvent,

    /// A `position_update` payload lacked a numeric x, y or timestamp.
    #[error("invalid position payload: {0}")]
    InvalidPosition(String),

    /// A coordinate fell outside the logical range `[0, max)`.
    #[error("coordinate {axis}={value} outside [0, {max})")]
    OutOfRange {
        /// Which axis was rejected (`"x"` or `"y"`).
        axis: &'static str,
        /// The rejected value.
        value: f64,
        /// Exclusive upper bound of the logical range.
        max: f64,
    },
}

/// Crate-wide error enum.
///
/// # Recovery
///
/// | Variant        | Recovered by                      |
/// |----------------|-----------------------------------|
/// | `Decode`       | dropping the frame, session stays |
/// | `Transport`    | reconnect state machine           |
/// | `Construction` | reconnect state machine           |
/// | `Geometry`     | containment reports `false`       |
/// | `InvalidConfig`| not recovered (startup only)      |
/// | `NoRuntime`    | not recovered (programming error) |
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// A frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The live session failed or was closed by the peer.
    #[error("transport error: {0}")]
    Transport(String),

    /// A session could not be established at all.
    #[error("could not establish session: {0}")]
    Construction(String),

    /// Configuration value present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The boundary asset could not be read or parsed.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// `start()` was called outside a Tokio runtime.
    #[error("no tokio runtime available to drive the session")]
    NoRuntime,
}

impl TrackerError {
    /// Returns `true` if the error is healed without caller intervention.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::Transport(_) | Self::Construction(_) | Self::Geometry(_)
        )
    }
}
