//! Containment of the tracked position within the boundary geometry.
//!
//! Positions live in a logical space `[0, coord_max)` on both axes. The
//! engine scales them into geometry space by the ratio of the geometry's
//! viewport to that range, then asks each shape in turn whether the point
//! lies in its fill. The first shape that answers yes wins.
//!
//! The engine holds no cached answer: every call is a pure function of the
//! position passed in and the geometry installed at that moment.

use super::boundary::{BoundaryGeometry, Viewport};
use super::handle::GeometryHandle;
use super::shape::Point;
use crate::domain::Position;

/// Evaluates whether a position lies inside the injected boundary.
#[derive(Debug, Clone)]
pub struct ContainmentEngine {
    geometry: GeometryHandle,
    coord_max: f64,
}

impl ContainmentEngine {
    /// Creates an engine over `geometry` for logical range `[0, coord_max)`.
    #[must_use]
    pub fn new(geometry: GeometryHandle, coord_max: f64) -> Self {
        Self {
            geometry,
            coord_max,
        }
    }

    /// Returns the handle the engine queries.
    #[must_use]
    pub fn geometry(&self) -> &GeometryHandle {
        &self.geometry
    }

    /// Maps a logical position into the space of `viewport`.
    #[must_use]
    pub fn to_geometry_space(&self, position: &Position, viewport: Viewport) -> Point {
        Point::new(
            position.x / self.coord_max * viewport.width,
            position.y / self.coord_max * viewport.height,
        )
    }

    /// Returns `true` if `position` lies inside any boundary shape.
    ///
    /// Reports `false` while geometry is unavailable.
    #[must_use]
    pub fn contains(&self, position: &Position) -> bool {
        self.locate(position).is_some()
    }

    /// Returns the index of the first shape containing `position`.
    #[must_use]
    pub fn locate(&self, position: &Position) -> Option<usize> {
        let geometry = self.geometry.current()?;
        self.locate_in(geometry.as_ref(), position)
    }

    /// Returns the id of the first shape containing `position`.
    #[must_use]
    pub fn locate_id(&self, position: &Position) -> Option<String> {
        let geometry = self.geometry.current()?;
        let index = self.locate_in(geometry.as_ref(), position)?;
        geometry.shape_id(index).map(str::to_string)
    }

    fn locate_in(&self, geometry: &dyn BoundaryGeometry, position: &Position) -> Option<usize> {
        let point = self.to_geometry_space(position, geometry.viewport());
        if !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        (0..geometry.shape_count()).find(|&index| geometry.is_point_in_fill(index, point))
    }
}
