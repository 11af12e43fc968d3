//! The road and every vehicle on it, advanced one tick at a time.
//!
//! A tick runs in two phases, each parallelised over vehicles with rayon:
//! 1. every vehicle integrates its kinematics and tests collision against the
//!    polygons of the previous tick;
//! 2. every vehicle recasts its sensor against the new polygons and, when
//!    autonomous, overwrites its controls with the network's outputs.
//!
//! Traffic treats the road borders and every other vehicle as obstacles.
//! Manual and autonomous vehicles only see the borders and traffic, so a
//! whole population of learners can share the road.

use geo::Coord;
use rayon::prelude::*;

use super::error::SimulationError;
use super::geometry::{Point, Polygon};
use super::network::Network;
use super::params::Params;
use super::road::Road;
use super::vehicle::{KinematicParams, Vehicle, VehicleSnapshot};

/// Simulation state.
#[derive(Debug, Clone)]
pub struct World {
    road: Road,
    vehicles: Vec<Vehicle>,
    kinematics: KinematicParams,
    ticks: u64,
}

impl World {
    /// Creates an empty world.
    pub fn new(road: Road, kinematics: KinematicParams) -> Self {
        Self {
            road,
            vehicles: Vec::new(),
            kinematics,
            ticks: 0,
        }
    }

    /// Builds the configured road and traffic, then one autonomous vehicle per
    /// network in the spawn lane.
    pub fn from_params(params: &Params, networks: Vec<Network>) -> Result<Self, SimulationError> {
        let road = Road::new(params.road_center_x, params.road_width, params.lane_count);
        let mut world = Self::new(road, params.kinematics);

        for spawn in &params.traffic {
            let center = Coord {
                x: world.road.lane_center(spawn.lane),
                y: spawn.y,
            };
            world.add_vehicle(Vehicle::traffic(center, params));
        }

        let start = Coord {
            x: world.road.lane_center(params.spawn_lane),
            y: params.spawn_y,
        };
        for network in networks {
            world.add_vehicle(Vehicle::autonomous(start, params, network)?);
        }

        Ok(world)
    }

    /// Adds a vehicle and returns its index.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> usize {
        self.vehicles.push(vehicle);
        self.vehicles.len() - 1
    }

    /// The road.
    pub fn road(&self) -> &Road {
        &self.road
    }

    /// All vehicles in insertion order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Vehicle by index.
    pub fn vehicle(&self, index: usize) -> Option<&Vehicle> {
        self.vehicles.get(index)
    }

    /// Mutable vehicle by index, e.g. to forward key presses.
    pub fn vehicle_mut(&mut self, index: usize) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(index)
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances every vehicle by one tick.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        let borders = self.road.border_polygons();
        let kinematics = self.kinematics;

        let solids = self.solid_polygons();
        self.vehicles
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, vehicle)| {
                let obstacles = obstacle_set(&borders, &solids, index);
                vehicle.advance(&obstacles, &kinematics);
            });

        let solids = self.solid_polygons();
        self.vehicles
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(index, vehicle)| {
                let obstacles = obstacle_set(&borders, &solids, index);
                vehicle.perceive(&obstacles)
            })?;

        self.ticks += 1;
        Ok(())
    }

    /// Obstacle set seen by the vehicle at `index` right now.
    pub fn obstacles_for(&self, index: usize) -> Vec<Polygon> {
        let borders = self.road.border_polygons();
        let solids = self.solid_polygons();
        obstacle_set(&borders, &solids, index)
            .into_iter()
            .map(<[Point]>::to_vec)
            .collect()
    }

    /// Autonomous vehicles that have not crashed.
    pub fn autonomous_alive(&self) -> usize {
        self.vehicles
            .iter()
            .filter(|vehicle| vehicle.is_autonomous() && !vehicle.collided())
            .count()
    }

    /// The autonomous vehicle with the most forward progress. The earliest
    /// added vehicle wins ties.
    pub fn best_autonomous(&self) -> Option<&Vehicle> {
        self.vehicles
            .iter()
            .filter(|vehicle| vehicle.is_autonomous())
            .fold(None, |best: Option<&Vehicle>, vehicle| match best {
                Some(current) if current.progress() >= vehicle.progress() => Some(current),
                _ => Some(vehicle),
            })
    }

    /// Drawable state of every vehicle.
    pub fn snapshots(&self) -> Vec<VehicleSnapshot> {
        self.vehicles.iter().map(Vehicle::snapshot).collect()
    }

    fn solid_polygons(&self) -> Vec<Solid> {
        self.vehicles
            .iter()
            .enumerate()
            .map(|(index, vehicle)| Solid {
                owner: index,
                traffic: vehicle.is_traffic(),
                polygon: vehicle.polygon().to_vec(),
            })
            .collect()
    }
}

/// A vehicle polygon frozen for one phase of a tick.
struct Solid {
    owner: usize,
    traffic: bool,
    polygon: Polygon,
}

fn obstacle_set<'a>(
    borders: &'a [Polygon],
    solids: &'a [Solid],
    index: usize,
) -> Vec<&'a [Point]> {
    let sees_everyone = solids.get(index).is_some_and(|solid| solid.traffic);
    borders
        .iter()
        .map(Vec::as_slice)
        .chain(
            solids
                .iter()
                .filter(|solid| solid.owner != index && (sees_everyone || solid.traffic))
                .map(|solid| solid.polygon.as_slice()),
        )
        .collect()
}
