//! Top-level error type for simulation setup, ticking and persistence.

use thiserror::Error;

use super::network::NetworkError;

/// Errors surfaced by the simulation library.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Building, loading or running a network failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// An autonomous vehicle was given no sensor.
    #[error("autonomous vehicles need a sensor")]
    MissingSensor,
    /// Sensor ray count and network input count disagree.
    #[error("sensor casts {rays} rays but the network takes {inputs} inputs")]
    SensorMismatch {
        /// Rays cast by the sensor.
        rays: usize,
        /// Inputs expected by the network.
        inputs: usize,
    },
    /// The network does not produce one output per control channel.
    #[error("network yields {actual} outputs, expected {expected} control channels")]
    OutputMismatch {
        /// Control channels.
        expected: usize,
        /// Network outputs.
        actual: usize,
    },
    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
