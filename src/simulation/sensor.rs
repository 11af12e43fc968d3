//! Ray-cast distance sensor.
//!
//! A sensor casts a fan of fixed-length rays from its vehicle's center and
//! records, per ray, the nearest obstacle edge it crosses.

use geo::{Coord, Line};
use serde::{Deserialize, Serialize};

use super::geometry::{Point, Segment, Touch, lerp, polygon_edges, segment_intersection};

/// Sensor geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorParams {
    /// Number of rays in the fan.
    pub ray_count: usize,
    /// Length of every ray.
    pub ray_length: f64,
    /// Angle between the outermost rays, in radians.
    pub ray_spread: f64,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            ray_count: 5,
            ray_length: 150.0,
            ray_spread: std::f64::consts::FRAC_PI_2,
        }
    }
}

/// Ray fan and its latest readings.
///
/// Rays and readings are recomputed on every [`Sensor::update`]; neither
/// carries over between ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    params: SensorParams,
    rays: Vec<Segment>,
    readings: Vec<Option<Touch>>,
}

impl Sensor {
    /// Creates a sensor that has not cast any rays yet.
    pub fn new(params: SensorParams) -> Self {
        Self {
            params,
            rays: Vec::with_capacity(params.ray_count),
            readings: Vec::with_capacity(params.ray_count),
        }
    }

    /// Number of rays, and therefore of network inputs.
    pub fn ray_count(&self) -> usize {
        self.params.ray_count
    }

    /// Sensor geometry.
    pub fn params(&self) -> SensorParams {
        self.params
    }

    /// Rays cast by the last update.
    pub fn rays(&self) -> &[Segment] {
        &self.rays
    }

    /// Nearest touch per ray from the last update; `None` when the ray hit
    /// nothing.
    pub fn readings(&self) -> &[Option<Touch>] {
        &self.readings
    }

    /// Recasts the fan from `origin` facing `heading` and measures every ray
    /// against `obstacles`.
    pub fn update(&mut self, origin: Point, heading: f64, obstacles: &[&[Point]]) {
        self.cast_rays(origin, heading);
        self.readings = self
            .rays
            .iter()
            .map(|ray| nearest_touch(ray, obstacles))
            .collect();
    }

    /// Network inputs: `1 - offset` per ray, so close obstacles read near `1`
    /// and empty rays read `0`.
    pub fn inputs(&self) -> Vec<f64> {
        self.readings
            .iter()
            .map(|reading| reading.map_or(0.0, |touch| 1.0 - touch.offset))
            .collect()
    }

    fn cast_rays(&mut self, origin: Point, heading: f64) {
        let SensorParams {
            ray_count,
            ray_length,
            ray_spread,
        } = self.params;

        self.rays.clear();
        for i in 0..ray_count {
            let t = if ray_count == 1 {
                0.5
            } else {
                i as f64 / (ray_count - 1) as f64
            };
            let angle = lerp(ray_spread / 2.0, -ray_spread / 2.0, t) + heading;
            let end = Coord {
                x: origin.x - angle.sin() * ray_length,
                y: origin.y - angle.cos() * ray_length,
            };
            self.rays.push(Line::new(origin, end));
        }
    }
}

/// Smallest-offset touch of `ray` against every edge of every obstacle.
/// Earlier touches win ties.
fn nearest_touch(ray: &Segment, obstacles: &[&[Point]]) -> Option<Touch> {
    obstacles
        .iter()
        .flat_map(|&obstacle| polygon_edges(obstacle))
        .filter_map(|edge| segment_intersection(&edge, ray))
        .fold(None, |nearest: Option<Touch>, touch| match nearest {
            Some(best) if best.offset <= touch.offset => Some(best),
            _ => Some(touch),
        })
}
