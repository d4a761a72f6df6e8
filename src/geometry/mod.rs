//! Boundary geometry and containment evaluation.
//!
//! [`BoundaryGeometry`] is the capability injected from outside;
//! [`GeometryHandle`] tracks whether it has loaded yet; and
//! [`ContainmentEngine`] maps positions into geometry space and tests them.

pub mod boundary;
pub mod containment;
pub mod handle;
pub mod shape;

pub use boundary::{BoundaryGeometry, PolygonBoundary, Viewport};
pub use containment::ContainmentEngine;
pub use handle::GeometryHandle;
pub use shape::{FillRule, Point, Shape};
