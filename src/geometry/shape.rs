//! Closed shapes and the point-in-fill predicate.
//!
//! A [`Shape`] is one or more closed rings. Whether a point is "in the
//! fill" depends on the shape's [`FillRule`], exactly as vector renderers
//! decide which pixels to paint:
//!
//! - [`FillRule::NonZero`]: inside when the winding number is not zero.
//! - [`FillRule::EvenOdd`]: inside when the winding number is odd.
//!
//! Points lying on an edge count as inside under both rules.

use serde::Deserialize;

/// Tolerance for the on-edge test, in geometry-space units.
const EDGE_EPSILON: f64 = 1e-9;

/// A point in boundary-geometry space.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Rule deciding which regions of a self-overlapping shape are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillRule {
    /// Filled where the winding number is non-zero.
    #[default]
    NonZero,
    /// Filled where the winding number is odd.
    EvenOdd,
}

/// A closed, possibly multi-ring, filled shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Shape {
    /// Stable name of the shape (e.g. an administrative subdivision).
    pub id: String,
    /// Fill rule implied by the shape's own winding.
    #[serde(default)]
    pub fill_rule: FillRule,
    /// Closed rings; the closing edge from last to first vertex is implicit.
    pub rings: Vec<Vec<Point>>,
}

impl Shape {
    /// Creates a shape from its rings.
    #[must_use]
    pub fn new(id: impl Into<String>, fill_rule: FillRule, rings: Vec<Vec<Point>>) -> Self {
        Self {
            id: id.into(),
            fill_rule,
            rings,
        }
    }

    /// Returns `true` if `point` lies in the shape's fill.
    #[must_use]
    pub fn is_point_in_fill(&self, point: Point) -> bool {
        let mut winding = 0_i64;
        for ring in self.rings.iter().filter(|ring| ring.len() >= 3) {
            match ring_winding(ring, point) {
                Winding::OnEdge => return true,
                Winding::Number(n) => winding += n,
            }
        }
        match self.fill_rule {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding.rem_euclid(2) == 1,
        }
    }
}

enum Winding {
    OnEdge,
    Number(i64),
}

/// Winding number of `ring` around `p`, counting upward crossings to the
/// right of `p` as +1 and downward ones as -1.
fn ring_winding(ring: &[Point], p: Point) -> Winding {
    let mut winding = 0_i64;
    let next = ring.iter().cycle().skip(1);
    for (a, b) in ring.iter().zip(next) {
        let side = cross(*a, *b, p);
        if side.abs() <= EDGE_EPSILON && within_bounds(*a, *b, p) {
            return Winding::OnEdge;
        }
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }
    Winding::Number(winding)
}

/// Twice the signed area of triangle `a b p`: positive when `p` is left of
/// the directed edge `a -> b`.
fn cross(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

fn within_bounds(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - EDGE_EPSILON
        && p.x <= a.x.max(b.x) + EDGE_EPSILON
        && p.y >= a.y.min(b.y) - EDGE_EPSILON
        && p.y <= a.y.max(b.y) + EDGE_EPSILON
}
