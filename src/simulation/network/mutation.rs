//! Mutation operator for evolutionary search.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Layer, Network, NetworkError};
use crate::simulation::geometry::lerp;

/// How far mutated parameters are blended toward fresh random values.
///
/// `0` keeps the seed, `1` replaces every value. Construction rejects values
/// outside `[0, 1]`, including NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MutationStrength(f64);

impl MutationStrength {
    /// Exact clone.
    pub const NONE: Self = Self(0.0);
    /// Fully random replacement.
    pub const FULL: Self = Self(1.0);

    /// Validates a user-supplied strength.
    pub fn new(value: f64) -> Result<Self, NetworkError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(NetworkError::InvalidMutationStrength(value))
        }
    }

    /// Clamps into `[0, 1]`; NaN becomes `0`.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Self::NONE
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// The raw blend factor.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for MutationStrength {
    type Error = NetworkError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MutationStrength> for f64 {
    fn from(strength: MutationStrength) -> Self {
        strength.0
    }
}

impl Network {
    /// Returns a new network whose parameters are `lerp(v, r, strength)` for
    /// every seed value `v` and a fresh uniform draw `r` in `[-1, 1)`.
    ///
    /// The seed is left untouched. Per layer, biases are drawn before weights,
    /// and weights in row-major order.
    pub fn mutate<R: Rng + ?Sized>(&self, rng: &mut R, strength: MutationStrength) -> Network {
        let layers = self
            .layers
            .iter()
            .map(|layer| layer.mutated(rng, strength.get()))
            .collect();
        Network::from_layers(layers)
    }
}

impl Layer {
    fn mutated<R: Rng + ?Sized>(&self, rng: &mut R, amount: f64) -> Layer {
        let mut blend = |value: f64| lerp(value, rng.random_range(-1.0..1.0), amount);
        let biases = self.biases().mapv(&mut blend);
        let weights = self.weights().mapv(&mut blend);
        Layer::with_parameters(biases, weights)
    }
}
