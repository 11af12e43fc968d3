//! Vehicle state, kinematics and collision.
//!
//! Heading `0` points up (toward negative y). Moving forward subtracts
//! `sin(heading) * speed` from x and `cos(heading) * speed` from y; the
//! polygon and the sensor fan use the same convention.

use std::f64::consts::PI;

use geo::Coord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::controls::{ControlKey, Controls};
use super::error::SimulationError;
use super::geometry::{Point, Polygon, Segment, Touch, polygon_intersection};
use super::network::{LayerSnapshot, Network, NetworkError};
use super::params::Params;
use super::sensor::Sensor;

/// Network outputs, in order: forward, left, right, reverse.
pub const CONTROL_CHANNELS: usize = 4;

/// Integration constants applied every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicParams {
    /// Speed gained per tick at full throttle.
    pub acceleration: f64,
    /// Speed lost per tick while moving.
    pub friction: f64,
    /// Heading change per tick at full steering, in radians.
    pub steering_rate: f64,
}

impl Default for KinematicParams {
    fn default() -> Self {
        Self {
            acceleration: 0.2,
            friction: 0.05,
            steering_rate: 0.03,
        }
    }
}

/// Who decides a vehicle's controls.
#[derive(Debug, Clone)]
pub enum Driver {
    /// Controls come from key presses.
    Manual,
    /// Fixed rule: always full throttle.
    Traffic,
    /// Controls come from the network, fed by the sensor.
    Autonomous {
        /// The controlling network.
        network: Network,
    },
}

/// Tag of a [`Driver`] without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverKind {
    /// Key presses.
    Manual,
    /// Fixed rule.
    Traffic,
    /// Network.
    Autonomous,
}

impl Driver {
    /// Returns the tag.
    pub fn kind(&self) -> DriverKind {
        match self {
            Driver::Manual => DriverKind::Manual,
            Driver::Traffic => DriverKind::Traffic,
            Driver::Autonomous { .. } => DriverKind::Autonomous,
        }
    }
}

/// A rectangular vehicle on the road.
#[derive(Debug, Clone)]
pub struct Vehicle {
    center: Point,
    heading: f64,
    speed: f64,
    width: f64,
    height: f64,
    max_speed: f64,
    polygon: Polygon,
    collided: bool,
    controls: Controls,
    sensor: Option<Sensor>,
    driver: Driver,
    spawn_y: f64,
    min_y: f64,
}

/// Everything a renderer needs to draw one vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    /// Driver tag.
    pub kind: DriverKind,
    /// Center point.
    pub center: Point,
    /// Heading in radians.
    pub heading: f64,
    /// Signed speed.
    pub speed: f64,
    /// Whether the vehicle has crashed.
    pub collided: bool,
    /// Footprint corners.
    pub polygon: Polygon,
    /// Current control signals.
    pub controls: Controls,
    /// Sensor rays, empty without a sensor.
    pub rays: Vec<Segment>,
    /// Sensor readings, one per ray.
    pub readings: Vec<Option<Touch>>,
    /// Network layers of autonomous vehicles.
    pub network: Option<Vec<LayerSnapshot>>,
    /// Forward progress since spawn.
    pub progress: f64,
}

impl Vehicle {
    /// Creates a vehicle at rest facing up.
    ///
    /// Autonomous drivers need a sensor with one ray per network input and a
    /// network with one output per control channel.
    pub fn new(
        center: Point,
        width: f64,
        height: f64,
        max_speed: f64,
        driver: Driver,
        sensor: Option<Sensor>,
    ) -> Result<Self, SimulationError> {
        if let Driver::Autonomous { network } = &driver {
            let sensor = sensor.as_ref().ok_or(SimulationError::MissingSensor)?;
            if sensor.ray_count() != network.input_count() {
                return Err(SimulationError::SensorMismatch {
                    rays: sensor.ray_count(),
                    inputs: network.input_count(),
                });
            }
            if network.output_count() != CONTROL_CHANNELS {
                return Err(SimulationError::OutputMismatch {
                    expected: CONTROL_CHANNELS,
                    actual: network.output_count(),
                });
            }
        }

        Ok(Self::assemble(center, width, height, max_speed, driver, sensor))
    }

    /// Keyboard-driven vehicle with a sensor for display.
    pub fn manual(center: Point, params: &Params) -> Self {
        Self::assemble(
            center,
            params.vehicle_width,
            params.vehicle_height,
            params.max_speed_manual,
            Driver::Manual,
            Some(Sensor::new(params.sensor)),
        )
    }

    /// Fixed-rule traffic vehicle without a sensor.
    pub fn traffic(center: Point, params: &Params) -> Self {
        Self::assemble(
            center,
            params.vehicle_width,
            params.vehicle_height,
            params.max_speed_traffic,
            Driver::Traffic,
            None,
        )
    }

    /// Network-driven vehicle.
    pub fn autonomous(
        center: Point,
        params: &Params,
        network: Network,
    ) -> Result<Self, SimulationError> {
        Self::new(
            center,
            params.vehicle_width,
            params.vehicle_height,
            params.max_speed_autonomous,
            Driver::Autonomous { network },
            Some(Sensor::new(params.sensor)),
        )
    }

    fn assemble(
        center: Point,
        width: f64,
        height: f64,
        max_speed: f64,
        driver: Driver,
        sensor: Option<Sensor>,
    ) -> Self {
        let controls = match driver {
            Driver::Traffic => Controls::cruising(),
            _ => Controls::default(),
        };
        let mut vehicle = Self {
            center,
            heading: 0.0,
            speed: 0.0,
            width,
            height,
            max_speed: max_speed.abs(),
            polygon: Vec::new(),
            collided: false,
            controls,
            sensor,
            driver,
            spawn_y: center.y,
            min_y: center.y,
        };
        vehicle.polygon = vehicle.build_polygon();
        vehicle
    }

    /// Center point.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Heading in radians; `0` is up.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Signed speed; negative while reversing.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Speed cap. Reverse is capped at half of it.
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Footprint corners as of the last kinematics step.
    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    /// Whether the vehicle has crashed. Crashed vehicles never move again.
    pub fn collided(&self) -> bool {
        self.collided
    }

    /// Current control signals.
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// The sensor, if fitted.
    pub fn sensor(&self) -> Option<&Sensor> {
        self.sensor.as_ref()
    }

    /// The driver.
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// The controlling network of an autonomous vehicle.
    pub fn network(&self) -> Option<&Network> {
        match &self.driver {
            Driver::Autonomous { network } => Some(network),
            _ => None,
        }
    }

    /// Whether this is fixed-rule traffic.
    pub fn is_traffic(&self) -> bool {
        matches!(self.driver, Driver::Traffic)
    }

    /// Whether this vehicle is driven by a network.
    pub fn is_autonomous(&self) -> bool {
        matches!(self.driver, Driver::Autonomous { .. })
    }

    /// Forward distance gained since spawn: spawn y minus the smallest y
    /// reached.
    pub fn progress(&self) -> f64 {
        self.spawn_y - self.min_y
    }

    /// Applies a key event. Only manual vehicles listen; returns whether the
    /// key was applied.
    pub fn press_key(&mut self, key: ControlKey, pressed: bool) -> bool {
        if matches!(self.driver, Driver::Manual) {
            self.controls.apply_key(key, pressed);
            true
        } else {
            false
        }
    }

    /// Advances one full tick against a single obstacle set: kinematics and
    /// collision, then sensing and inference.
    pub fn update(
        &mut self,
        obstacles: &[&[Point]],
        kinematics: &KinematicParams,
    ) -> Result<(), NetworkError> {
        self.advance(obstacles, kinematics);
        self.perceive(obstacles)
    }

    /// Integrates one kinematics step, rebuilds the polygon and tests it
    /// against `obstacles`. Does nothing once collided.
    pub fn advance(&mut self, obstacles: &[&[Point]], kinematics: &KinematicParams) {
        if self.collided {
            return;
        }

        self.integrate(kinematics);
        self.polygon = self.build_polygon();
        self.min_y = self.min_y.min(self.center.y);

        if let Some(touch) = obstacles
            .iter()
            .find_map(|&obstacle| polygon_intersection(&self.polygon, obstacle))
        {
            self.collided = true;
            debug!(
                kind = ?self.driver.kind(),
                at = ?touch.point(),
                progress = self.progress(),
                "vehicle collided"
            );
        }
    }

    /// Recasts the sensor and, for autonomous vehicles, runs the network.
    ///
    /// Crashed vehicles still sense and infer, but their controls are no
    /// longer overwritten.
    pub fn perceive(&mut self, obstacles: &[&[Point]]) -> Result<(), NetworkError> {
        let Some(sensor) = self.sensor.as_mut() else {
            return Ok(());
        };
        sensor.update(self.center, self.heading, obstacles);

        if let Driver::Autonomous { network } = &mut self.driver {
            let outputs = network.feed_forward(&sensor.inputs())?;
            if !self.collided {
                self.controls.apply_outputs(&outputs);
            }
        }
        Ok(())
    }

    /// Copies the drawable state.
    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            kind: self.driver.kind(),
            center: self.center,
            heading: self.heading,
            speed: self.speed,
            collided: self.collided,
            polygon: self.polygon.clone(),
            controls: self.controls,
            rays: self.sensor.as_ref().map(|s| s.rays().to_vec()).unwrap_or_default(),
            readings: self
                .sensor
                .as_ref()
                .map(|s| s.readings().to_vec())
                .unwrap_or_default(),
            network: self.network().map(Network::snapshot),
            progress: self.progress(),
        }
    }

    fn integrate(&mut self, kinematics: &KinematicParams) {
        let KinematicParams {
            acceleration,
            friction,
            steering_rate,
        } = *kinematics;

        self.speed += acceleration * self.controls.forward;
        self.speed -= acceleration * self.controls.reverse;

        if self.speed > self.max_speed {
            self.speed = self.max_speed;
        }
        if self.speed < -self.max_speed / 2.0 {
            self.speed = -self.max_speed / 2.0;
        }

        if self.speed > 0.0 {
            self.speed = (self.speed - friction).max(0.0);
        } else if self.speed < 0.0 {
            self.speed = (self.speed + friction).min(0.0);
        }
        if self.speed.abs() < friction {
            self.speed = 0.0;
        }

        if self.speed != 0.0 {
            let flip = if self.speed > 0.0 { 1.0 } else { -1.0 };
            self.heading += steering_rate * flip * self.controls.left;
            self.heading -= steering_rate * flip * self.controls.right;
        }

        self.center.x -= self.heading.sin() * self.speed;
        self.center.y -= self.heading.cos() * self.speed;
    }

    fn build_polygon(&self) -> Polygon {
        let radius = self.width.hypot(self.height) / 2.0;
        let alpha = self.width.atan2(self.height);

        [
            self.heading - alpha,
            self.heading + alpha,
            PI + self.heading - alpha,
            PI + self.heading + alpha,
        ]
        .iter()
        .map(|angle| Coord {
            x: self.center.x - angle.sin() * radius,
            y: self.center.y - angle.cos() * radius,
        })
        .collect()
    }
}
