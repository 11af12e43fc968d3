//! Control signals driving a vehicle's kinematics.

use serde::{Deserialize, Serialize};

/// Keys accepted from a manual driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKey {
    /// Accelerate forward.
    Up,
    /// Brake, then reverse.
    Down,
    /// Steer left.
    Left,
    /// Steer right.
    Right,
}

/// Control-signal vector. Every channel is a magnitude in `[0, 1]`.
///
/// Network outputs are already binary, so for autonomous vehicles each
/// channel is either fully engaged or released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    /// Forward acceleration.
    pub forward: f64,
    /// Braking / reverse acceleration.
    pub reverse: f64,
    /// Steering toward increasing heading.
    pub left: f64,
    /// Steering toward decreasing heading.
    pub right: f64,
}

impl Controls {
    /// Fixed-rule traffic: full throttle, no steering.
    pub fn cruising() -> Self {
        Self {
            forward: 1.0,
            ..Self::default()
        }
    }

    /// Applies a key press or release from a manual driver.
    pub fn apply_key(&mut self, key: ControlKey, pressed: bool) {
        let value = if pressed { 1.0 } else { 0.0 };
        match key {
            ControlKey::Up => self.forward = value,
            ControlKey::Down => self.reverse = value,
            ControlKey::Left => self.left = value,
            ControlKey::Right => self.right = value,
        }
    }

    /// Overwrites the signals from a network output vector ordered
    /// `[forward, left, right, reverse]`.
    ///
    /// Missing channels are released; values are clamped into `[0, 1]`.
    pub fn apply_outputs(&mut self, outputs: &[f64]) {
        let channel = |i: usize| outputs.get(i).copied().unwrap_or(0.0).clamp(0.0, 1.0);
        self.forward = channel(0);
        self.left = channel(1);
        self.right = channel(2);
        self.reverse = channel(3);
    }
}
