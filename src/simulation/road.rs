//! Straight multi-lane road running along the y axis.

use geo::{Coord, Line};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::geometry::{Polygon, Segment, lerp};

/// Stand-in for an endless road.
const ROAD_EXTENT: f64 = 10_000_000.0;

/// A vertical road with evenly sized lanes and two solid borders.
///
/// Serializes as its layout and is rebuilt through [`Road::new`] on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "RoadLayout", from = "RoadLayout")]
pub struct Road {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    lane_count: usize,
    borders: [Segment; 2],
}

/// Persisted form of a [`Road`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadLayout {
    /// X coordinate of the road center.
    pub center_x: f64,
    /// Distance between the borders.
    pub width: f64,
    /// Number of lanes.
    pub lane_count: usize,
}

impl From<RoadLayout> for Road {
    fn from(layout: RoadLayout) -> Self {
        Road::new(layout.center_x, layout.width, layout.lane_count)
    }
}

impl From<Road> for RoadLayout {
    fn from(road: Road) -> Self {
        RoadLayout {
            center_x: (road.left + road.right) / 2.0,
            width: road.width(),
            lane_count: road.lane_count,
        }
    }
}

impl Road {
    /// Creates a road centered on `center_x`. A lane count of zero is raised
    /// to one.
    pub fn new(center_x: f64, width: f64, lane_count: usize) -> Self {
        let left = center_x - width / 2.0;
        let right = center_x + width / 2.0;
        let top = -ROAD_EXTENT;
        let bottom = ROAD_EXTENT;

        let top_left = Coord { x: left, y: top };
        let top_right = Coord { x: right, y: top };
        let bottom_left = Coord { x: left, y: bottom };
        let bottom_right = Coord { x: right, y: bottom };

        Self {
            left,
            right,
            top,
            bottom,
            lane_count: lane_count.max(1),
            borders: [
                Line::new(top_left, bottom_left),
                Line::new(top_right, bottom_right),
            ],
        }
    }

    /// Left edge x coordinate.
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Right edge x coordinate.
    pub fn right(&self) -> f64 {
        self.right
    }

    /// Road width.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Number of lanes.
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// The two border lines, left then right.
    pub fn borders(&self) -> &[Segment; 2] {
        &self.borders
    }

    /// Borders as two-point polygons for the obstacle set.
    pub fn border_polygons(&self) -> Vec<Polygon> {
        self.borders
            .iter()
            .map(|border| vec![border.start, border.end])
            .collect()
    }

    /// X coordinate of a lane's center. Indices past the last lane are
    /// clamped to it.
    pub fn lane_center(&self, lane: usize) -> f64 {
        let last = self.lane_count - 1;
        if lane > last {
            warn!(lane, last, "lane index out of range; using last lane");
        }
        let lane_width = self.width() / self.lane_count as f64;
        self.left + lane_width / 2.0 + lane.min(last) as f64 * lane_width
    }

    /// Dashed dividers between adjacent lanes, for drawing.
    pub fn lane_dividers(&self) -> Vec<Segment> {
        (1..self.lane_count)
            .map(|i| {
                let x = lerp(self.left, self.right, i as f64 / self.lane_count as f64);
                Line::new(Coord { x, y: self.top }, Coord { x, y: self.bottom })
            })
            .collect()
    }
}
