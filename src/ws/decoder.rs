//! Decoding of raw text frames into [`InboundEvent`]s.
//!
//! Decoding never panics and never tears the session down: every malformed
//! frame comes back as a [`DecodeError`] for the caller to report.

use serde_json::Value;

use super::messages::{CONNECTED, InboundEvent, POSITION_UPDATE};
use crate::domain::Position;
use crate::error::DecodeError;

/// Stateless frame decoder bound to a logical coordinate range.
#[derive(Debug, Clone, Copy)]
pub struct MessageDecoder {
    coord_max: f64,
}

impl MessageDecoder {
    /// Creates a decoder accepting coordinates in `[0, coord_max)`.
    #[must_use]
    pub const fn new(coord_max: f64) -> Self {
        Self { coord_max }
    }

    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::MalformedJson`] if the frame is not JSON.
    /// - [`DecodeError::MissingEvent`] if there is no string `event` field.
    /// - [`DecodeError::InvalidPosition`] if a `position_update` lacks a
    ///   numeric `x`, `y` or `timestamp`.
    /// - [`DecodeError::OutOfRange`] if a coordinate is outside the range.
    pub fn decode(&self, raw: &str) -> Result<InboundEvent, DecodeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| DecodeError::MalformedJson(e.to_string()))?;
        let Value::Object(mut envelope) = value else {
            return Err(DecodeError::MissingEvent);
        };
        let Some(Value::String(event)) = envelope.remove("event") else {
            return Err(DecodeError::MissingEvent);
        };
        let data = envelope.remove("data").unwrap_or(Value::Null);

        match event.as_str() {
            POSITION_UPDATE => self.decode_position(data).map(InboundEvent::PositionUpdate),
            CONNECTED => Ok(InboundEvent::Connected {
                message: data
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            _ => Ok(InboundEvent::Other { event }),
        }
    }

    fn decode_position(&self, data: Value) -> Result<Position, DecodeError> {
        let position: Position = serde_json::from_value(data)
            .map_err(|e| DecodeError::InvalidPosition(e.to_string()))?;
        match position.first_out_of_range(self.coord_max) {
            None => Ok(position),
            Some((axis, value)) => Err(DecodeError::OutOfRange {
                axis,
                value,
                max: self.coord_max,
            }),
        }
    }
}
