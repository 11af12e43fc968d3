//! # Selfdrive - Evolving Autonomous Vehicles
//!
//! A simulation of vehicles driving down a multi-lane road. Vehicles are driven
//! by key presses, by a fixed rule, or by a small threshold network fed from a
//! ray-cast sensor. Networks improve by random mutation of the best performer,
//! scored by how far it drove before crashing.
//!
//! ## Features
//!
//! - Exact segment and polygon intersection for collisions and sensing
//! - Discrete per-tick kinematics with friction and mirrored reverse steering
//! - Step-activation feedforward networks with lerp-based mutation
//! - Two-phase ticks, parallelised over vehicles with rayon
//! - JSON persistence of networks and parameters
//!
//! ## Core Modules
//!
//! - [`simulation::geometry`] - Intersection kernel
//! - [`simulation::vehicle`] - Vehicle state and kinematics
//! - [`simulation::sensor`] - Ray-cast distance sensor
//! - [`simulation::network`] - Feedforward network and mutation
//! - [`simulation::world`] - Tick driver
//! - [`simulation::evolution`] - Generations and training

/// Core simulation logic and data structures.
pub mod simulation {
    /// Control signals and manual key mapping.
    pub mod controls;
    /// Library error type.
    pub mod error;
    /// Generation seeding, selection and training.
    pub mod evolution;
    /// Segment intersection, polygon overlap and interpolation.
    pub mod geometry;
    /// Feedforward threshold network and its mutation operator.
    pub mod network;
    /// Simulation parameters.
    pub mod params;
    /// Multi-lane road geometry.
    pub mod road;
    /// Ray-cast distance sensor.
    pub mod sensor;
    /// Vehicle state, kinematics and collision.
    pub mod vehicle;
    /// Road plus vehicles, advanced tick by tick.
    pub mod world;
}
