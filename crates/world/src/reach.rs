//! Jump reach model.
//!
//! Answers "how far can a sprinting jump carry the body" for a given rise in
//! height. The generator caps every gap with this so layouts stay within what
//! the movement controller can actually cross.

use parkour_physics::MovementConfig;
use serde::{Deserialize, Serialize};

/// Ballistic reach of a running jump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpReach {
    /// Horizontal speed at takeoff (meters/second).
    pub run_speed: f32,
    /// Vertical velocity at takeoff (meters/second).
    pub jump_force: f32,
    /// Gravity (meters/second², positive).
    pub gravity: f32,
}

impl JumpReach {
    /// Reach of a sprint jump with the given movement tuning.
    pub fn from_movement(config: &MovementConfig) -> Self {
        Self {
            run_speed: config.sprint_speed,
            jump_force: config.jump_force,
            gravity: config.gravity,
        }
    }

    /// Same run speed with a different vertical launch velocity.
    pub fn with_launch(self, jump_force: f32) -> Self {
        Self { jump_force, ..self }
    }

    /// Height of the apex above the takeoff point.
    pub fn apex(&self) -> f32 {
        self.jump_force * self.jump_force / (2.0 * self.gravity)
    }

    /// Time until the body comes back down to `rise` above takeoff.
    ///
    /// Negative `rise` means landing below the takeoff point. Returns `None`
    /// when `rise` is above the apex.
    pub fn airtime(&self, rise: f32) -> Option<f32> {
        let v = self.jump_force;
        let discriminant = v * v - 2.0 * self.gravity * rise;
        if discriminant < 0.0 {
            return None;
        }
        Some((v + discriminant.sqrt()) / self.gravity)
    }

    /// Horizontal distance covered before landing `rise` above takeoff.
    pub fn distance(&self, rise: f32) -> Option<f32> {
        self.airtime(rise).map(|t| t * self.run_speed)
    }

    /// Horizontal distance for a landing at takeoff height.
    pub fn flat_distance(&self) -> f32 {
        2.0 * self.jump_force / self.gravity * self.run_speed
    }

    /// Largest longitudinal gap when the target is also shifted sideways.
    ///
    /// The combined diagonal never exceeds `max_distance`:
    /// `sqrt(max_distance² - lateral²)`, or 0 when the shift alone is too far.
    pub fn diagonal_cap(max_distance: f32, lateral: f32) -> f32 {
        let remaining = max_distance * max_distance - lateral * lateral;
        if remaining <= 0.0 {
            0.0
        } else {
            remaining.sqrt()
        }
    }
}
