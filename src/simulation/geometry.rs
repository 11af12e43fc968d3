//! Planar geometry kernel: linear interpolation, segment intersection and
//! polygon overlap.
//!
//! Points and segments are the `geo` crate's [`Coord`] and [`Line`] types.
//! Polygons are plain point lists that close implicitly from the last point
//! back to the first.

use geo::{Coord, Line};
use serde::{Deserialize, Serialize};

/// A location in the plane.
pub type Point = Coord<f64>;

/// An ordered pair of points. Used for obstacle edges and sensor rays.
pub type Segment = Line<f64>;

/// An implicitly closed sequence of points.
///
/// Vehicle footprints have four points; road borders are stored as
/// two-point polygons so they can share the same obstacle set.
pub type Polygon = Vec<Point>;

/// Intersection result: a point and a normalized offset along one of the two
/// segments involved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    /// X coordinate of the intersection.
    pub x: f64,
    /// Y coordinate of the intersection.
    pub y: f64,
    /// Intersection parameter along the second segment, in `[0, 1]`.
    pub offset: f64,
}

impl Touch {
    /// Returns the touch location as a point.
    pub fn point(&self) -> Point {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

/// Linear interpolation `a + (b - a) * t`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Intersects two segments.
///
/// Returns a touch when the intersection parameters along both segments lie
/// in `[0, 1]`. The point is interpolated along `first`, the offset is the
/// parameter along `second`.
///
/// Parallel and collinear segments never touch, even when they overlap.
pub fn segment_intersection(first: &Segment, second: &Segment) -> Option<Touch> {
    let (a, b) = (first.start, first.end);
    let (c, d) = (second.start, second.end);

    let t_top = (d.x - c.x) * (a.y - c.y) - (d.y - c.y) * (a.x - c.x);
    let u_top = (c.y - a.y) * (a.x - b.x) - (c.x - a.x) * (a.y - b.y);
    let bottom = (d.y - c.y) * (b.x - a.x) - (d.x - c.x) * (b.y - a.y);

    if bottom == 0.0 {
        return None;
    }

    let t = t_top / bottom;
    let u = u_top / bottom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Touch {
            x: lerp(a.x, b.x, t),
            y: lerp(a.y, b.y, t),
            offset: u,
        })
    } else {
        None
    }
}

/// Iterates over the edges of an implicitly closed polygon.
///
/// A polygon of `n` points yields `n` edges, the last one joining the final
/// point back to the first.
pub fn polygon_edges(polygon: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| Line::new(polygon[i], polygon[(i + 1) % n]))
}

/// Tests two polygons for overlap of their edges.
///
/// Edges of `first` form the outer loop and edges of `second` the inner loop;
/// the first touch found in that order is returned, not the closest one.
/// Containment without edge crossing is not reported.
pub fn polygon_intersection(first: &[Point], second: &[Point]) -> Option<Touch> {
    polygon_edges(first).find_map(|edge| {
        polygon_edges(second).find_map(|other| segment_intersection(&edge, &other))
    })
}
