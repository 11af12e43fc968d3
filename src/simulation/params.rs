use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::SimulationError;
use super::network::MutationStrength;
use super::sensor::SensorParams;
use super::vehicle::{CONTROL_CHANNELS, KinematicParams};

/// A fixed-rule traffic vehicle placed at setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficSpawn {
    /// Lane index, clamped to the road's last lane.
    pub lane: usize,
    /// Initial y coordinate. Smaller is further ahead.
    pub y: f64,
}

/// Simulation parameters. Missing fields in a JSON file take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Per-tick integration constants shared by all vehicles.
    pub kinematics: KinematicParams,
    /// Sensor geometry for manual and autonomous vehicles.
    pub sensor: SensorParams,
    /// Vehicle footprint width.
    pub vehicle_width: f64,
    /// Vehicle footprint height.
    pub vehicle_height: f64,
    /// Top speed of manually driven vehicles.
    pub max_speed_manual: f64,
    /// Top speed of fixed-rule traffic.
    pub max_speed_traffic: f64,
    /// Top speed of network-driven vehicles.
    pub max_speed_autonomous: f64,
    /// Hidden layer sizes between the sensor inputs and the control outputs.
    pub hidden_layers: Vec<usize>,
    /// Road center x coordinate.
    pub road_center_x: f64,
    /// Road width.
    pub road_width: f64,
    /// Number of lanes.
    pub lane_count: usize,
    /// Lane autonomous vehicles start in.
    pub spawn_lane: usize,
    /// Initial y coordinate of autonomous vehicles.
    pub spawn_y: f64,
    /// Fixed-rule traffic placed at setup.
    pub traffic: Vec<TrafficSpawn>,
    /// Autonomous vehicles per generation.
    pub population: usize,
    /// Blend toward random parameters when seeding a generation.
    pub mutation_strength: MutationStrength,
    /// Tick budget per generation.
    pub max_ticks_per_generation: u64,
    /// Seed for all randomness; `None` draws from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            kinematics: KinematicParams::default(),
            sensor: SensorParams::default(),
            vehicle_width: 30.0,
            vehicle_height: 50.0,
            max_speed_manual: 3.0,
            max_speed_traffic: 2.0,
            max_speed_autonomous: 5.0,
            hidden_layers: vec![6],
            road_center_x: 100.0,
            road_width: 180.0,
            lane_count: 3,
            spawn_lane: 1,
            spawn_y: 100.0,
            traffic: vec![
                TrafficSpawn { lane: 1, y: -100.0 },
                TrafficSpawn { lane: 0, y: -300.0 },
                TrafficSpawn { lane: 2, y: -300.0 },
                TrafficSpawn { lane: 0, y: -500.0 },
                TrafficSpawn { lane: 1, y: -500.0 },
                TrafficSpawn { lane: 1, y: -700.0 },
                TrafficSpawn { lane: 2, y: -700.0 },
            ],
            population: 100,
            mutation_strength: MutationStrength::clamped(0.1),
            max_ticks_per_generation: 3000,
            rng_seed: None,
        }
    }
}

impl Params {
    /// Network shape: sensor rays, hidden layers, control channels.
    pub fn network_shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(self.hidden_layers.len() + 2);
        shape.push(self.sensor.ray_count);
        shape.extend_from_slice(&self.hidden_layers);
        shape.push(CONTROL_CHANNELS);
        shape
    }

    /// Saves the parameters as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimulationError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads parameters from JSON.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
