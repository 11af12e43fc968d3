//! Generation seeding, selection and the training loop.
//!
//! Each generation starts from the best network found so far: slot 0 is an
//! exact clone and every other slot a mutation of it. Traffic can be stopped
//! by a learner it runs into, so a clone does not always replay its parent's
//! run; the trainer only replaces its best network when a generation beats it.

use std::path::Path;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::SimulationError;
use super::network::{MutationStrength, Network, NetworkData, NetworkError};
use super::params::Params;
use super::vehicle::Vehicle;
use super::world::World;

/// Builds `count` networks for a new generation.
///
/// With a seed, the first network is an exact clone and the rest are
/// mutations of it; without one, every network is freshly random.
pub fn seed_networks<R: Rng + ?Sized>(
    rng: &mut R,
    shape: &[usize],
    count: usize,
    seed: Option<&Network>,
    strength: MutationStrength,
) -> Result<Vec<Network>, NetworkError> {
    match seed {
        Some(seed) => {
            if seed.shape() != shape {
                warn!(
                    seed = ?seed.shape(),
                    ?shape,
                    "seed network shape differs from configured shape"
                );
            }
            debug!(count, strength = strength.get(), "seeding generation from best network");
            Ok((0..count)
                .map(|i| {
                    if i == 0 {
                        seed.clone()
                    } else {
                        seed.mutate(rng, strength)
                    }
                })
                .collect())
        }
        None => {
            debug!(count, ?shape, "seeding generation with random networks");
            (0..count).map(|_| Network::random(rng, shape)).collect()
        }
    }
}

/// Mutates a persisted network.
///
/// The strength is validated here; values outside `[0, 1]` are rejected.
pub fn mutate_persisted<R: Rng + ?Sized>(
    rng: &mut R,
    data: &NetworkData,
    strength: f64,
) -> Result<NetworkData, NetworkError> {
    let strength = MutationStrength::new(strength)?;
    let seed = Network::try_from(data)?;
    Ok(seed.mutate(rng, strength).to_data())
}

/// Outcome of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation number, starting at 1.
    pub generation: u32,
    /// Ticks simulated.
    pub ticks: u64,
    /// Progress of the generation's best vehicle.
    pub best_progress: f64,
    /// Best progress over every generation so far.
    pub record_progress: f64,
    /// Autonomous vehicles still running when the generation ended.
    pub survivors: usize,
    /// Autonomous vehicles in the generation.
    pub population: usize,
}

/// A trained network written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedBrain {
    /// When the file was written.
    pub saved_at: DateTime<Utc>,
    /// Generation that produced the network.
    pub generation: u32,
    /// Progress the network achieved.
    pub progress: f64,
    /// The network in persisted form.
    pub network: Network,
}

impl SavedBrain {
    /// Saves as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimulationError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads and validates a saved network.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Mutates the stored network into an untested child.
    ///
    /// The child keeps its parent's generation but has no progress of its own
    /// yet.
    pub fn mutated<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        strength: f64,
    ) -> Result<SavedBrain, NetworkError> {
        let data = mutate_persisted(rng, &self.network.to_data(), strength)?;
        Ok(SavedBrain {
            saved_at: Utc::now(),
            generation: self.generation,
            progress: 0.0,
            network: Network::try_from(data)?,
        })
    }
}

/// Runs generations and keeps the best network.
#[derive(Debug)]
pub struct Trainer {
    params: Params,
    rng: StdRng,
    best: Option<Network>,
    best_progress: f64,
    generation: u32,
}

impl Trainer {
    /// Creates a trainer. Randomness is seeded from `params.rng_seed` when set.
    pub fn new(params: Params) -> Self {
        let rng = match params.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            params,
            rng,
            best: None,
            best_progress: 0.0,
            generation: 0,
        }
    }

    /// Starts from an existing network instead of random ones.
    pub fn with_seed_network(mut self, network: Network) -> Self {
        self.best = Some(network);
        self
    }

    /// Parameters in use.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Best network so far.
    pub fn best(&self) -> Option<&Network> {
        self.best.as_ref()
    }

    /// Progress of the best network so far.
    pub fn best_progress(&self) -> f64 {
        self.best_progress
    }

    /// Generations completed.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Builds the world for the next generation without running it.
    pub fn next_world(&mut self) -> Result<World, SimulationError> {
        let networks = seed_networks(
            &mut self.rng,
            &self.params.network_shape(),
            self.params.population,
            self.best.as_ref(),
            self.params.mutation_strength,
        )?;
        World::from_params(&self.params, networks)
    }

    /// Runs one generation until every autonomous vehicle has crashed or the
    /// tick budget is spent. The generation's best network replaces the kept one
    /// only when it sets a new record.
    pub fn run_generation(&mut self) -> Result<GenerationReport, SimulationError> {
        let mut world = self.next_world()?;
        while world.ticks() < self.params.max_ticks_per_generation && world.autonomous_alive() > 0
        {
            world.step()?;
        }

        self.generation += 1;
        let best = world.best_autonomous();
        let best_progress = best.map_or(0.0, Vehicle::progress);
        if let Some(network) = best.and_then(Vehicle::network) {
            if self.best.is_none() || best_progress > self.best_progress {
                self.best_progress = best_progress;
                self.best = Some(network.clone());
            }
        }

        let report = GenerationReport {
            generation: self.generation,
            ticks: world.ticks(),
            best_progress,
            record_progress: self.best_progress,
            survivors: world.autonomous_alive(),
            population: self.params.population,
        };
        info!(
            generation = report.generation,
            ticks = report.ticks,
            best_progress = report.best_progress,
            record_progress = report.record_progress,
            survivors = report.survivors,
            "generation complete"
        );
        Ok(report)
    }

    /// The best network wrapped for saving.
    pub fn saved_brain(&self) -> Option<SavedBrain> {
        self.best.as_ref().map(|network| SavedBrain {
            saved_at: Utc::now(),
            generation: self.generation,
            progress: self.best_progress,
            network: network.clone(),
        })
    }
}
