//! Simulated position sources.

use std::fmt;

use chrono::Utc;
use rand::Rng;

use crate::config::PublisherConfig;
use crate::domain::Position;

/// Produces the next position of the simulated agent.
pub trait PositionGenerator: Send + Sync + fmt::Debug {
    /// Generates one position stamped with the current time.
    fn generate(&self) -> Position;
}

/// Uniformly random positions within fixed bounds.
#[derive(Debug, Clone, Copy)]
pub struct RandomGenerator {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl RandomGenerator {
    /// Creates a generator over `[min_x, max_x) × [min_y, max_y)`.
    ///
    /// Callers must ensure each minimum is below its maximum;
    /// [`PublisherConfig`] enforces this when loaded from the environment.
    #[must_use]
    pub const fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Creates a generator from publisher configuration.
    #[must_use]
    pub const fn from_config(config: &PublisherConfig) -> Self {
        Self::new(config.min_x, config.max_x, config.min_y, config.max_y)
    }
}

impl PositionGenerator for RandomGenerator {
    fn generate(&self) -> Position {
        let mut rng = rand::rng();
        let x = self.min_x + rng.random::<f64>() * (self.max_x - self.min_x);
        let y = self.min_y + rng.random::<f64>() * (self.max_y - self.min_y);
        // Guard against rounding up to the exclusive bound.
        let x = if x >= self.max_x { self.min_x } else { x };
        let y = if y >= self.max_y { self.min_y } else { y };
        #[allow(clippy::cast_precision_loss)]
        let timestamp = Utc::now().timestamp_millis() as f64;
        Position::new(x, y, timestamp)
    }
}
