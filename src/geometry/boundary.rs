//! Boundary geometry capability and its polygon-asset implementation.
//!
//! The containment engine never owns geometry; it queries whatever
//! [`BoundaryGeometry`] was injected. [`PolygonBoundary`] is the bundled
//! implementation, loaded from a JSON asset:
//!
//! ```json
//! {
//!   "viewport": { "width": 10.0, "height": 10.0 },
//!   "shapes": [
//!     { "id": "hokkaido", "fill_rule": "nonzero", "rings": [[[1, 1], [4, 1], [4, 3]]] }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::shape::{Point, Shape};
use crate::error::TrackerError;

/// Logical viewport of the geometry (the SVG `viewBox` size).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Viewport {
    /// Viewport width in geometry units.
    pub width: f64,
    /// Viewport height in geometry units.
    pub height: f64,
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Externally supplied, immutable set of shapes with per-shape fill queries.
///
/// Shapes are addressed by index in a stable order.
pub trait BoundaryGeometry: Send + Sync + fmt::Debug {
    /// Returns the geometry's logical viewport.
    fn viewport(&self) -> Viewport;

    /// Returns the number of shapes.
    fn shape_count(&self) -> usize;

    /// Returns the id of the shape at `index`, if it exists.
    fn shape_id(&self, index: usize) -> Option<&str>;

    /// Returns `true` if `point` lies in the fill of the shape at `index`.
    /// Out-of-bounds indices report `false`.
    fn is_point_in_fill(&self, index: usize, point: Point) -> bool;
}

/// Boundary made of polygon shapes, deserialized from a JSON asset.
#[derive(Debug, Clone, Deserialize)]
pub struct PolygonBoundary {
    viewport: Viewport,
    shapes: Vec<Shape>,
}

impl PolygonBoundary {
    /// Creates a boundary from already-built shapes.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Geometry`] if the viewport is not a positive,
    /// finite size.
    pub fn new(viewport: Viewport, shapes: Vec<Shape>) -> Result<Self, TrackerError> {
        if !viewport.is_usable() {
            return Err(TrackerError::Geometry(format!(
                "viewport must be positive and finite, got {}x{}",
                viewport.width, viewport.height
            )));
        }
        Ok(Self { viewport, shapes })
    }

    /// Parses a boundary asset.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Geometry`] on malformed JSON or an unusable
    /// viewport.
    pub fn from_json(json: &str) -> Result<Self, TrackerError> {
        let raw: Self =
            serde_json::from_str(json).map_err(|e| TrackerError::Geometry(e.to_string()))?;
        Self::new(raw.viewport, raw.shapes)
    }

    /// Reads and parses a boundary asset from disk.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Geometry`] if the file cannot be read or
    /// parsed.
    pub async fn load(path: &Path) -> Result<Self, TrackerError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TrackerError::Geometry(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Returns the shapes in query order.
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }
}

impl BoundaryGeometry for PolygonBoundary {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn shape_id(&self, index: usize) -> Option<&str> {
        self.shapes.get(index).map(|s| s.id.as_str())
    }

    fn is_point_in_fill(&self, index: usize, point: Point) -> bool {
        self.shapes
            .get(index)
            .is_some_and(|shape| shape.is_point_in_fill(point))
    }
}
