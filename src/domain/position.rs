//! Position of the tracked agent in logical coordinate space.

use serde::{Deserialize, Serialize};

/// Latest known location of the tracked agent.
///
/// `x` and `y` are normalized to the logical range `[0, MAX)` configured
/// for the tracker. `timestamp` is whatever instant the publisher attached;
/// it is carried through but never used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal logical coordinate.
    pub x: f64,
    /// Vertical logical coordinate (grows downwards, like screen space).
    pub y: f64,
    /// Publisher-supplied instant.
    pub timestamp: f64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64, timestamp: f64) -> Self {
        Self { x, y, timestamp }
    }

    /// Returns the first axis (`x` before `y`) whose coordinate falls
    /// outside `[0, max)`, with the offending value. NaN is always outside.
    #[must_use]
    pub fn first_out_of_range(&self, max: f64) -> Option<(&'static str, f64)> {
        [("x", self.x), ("y", self.y)]
            .into_iter()
            .find(|(_, value)| !(0.0..max).contains(value))
    }
}
