//! Movement tuning.
//!
//! All movement parameters are grouped here for easy tuning. Units are meters
//! and seconds throughout.

use serde::{Deserialize, Serialize};

use crate::error::{require_positive, ConfigError};

use super::state::MovementMode;

/// Configuration for the parkour movement controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Body Dimensions
    // ========================================================================
    /// Collision radius (meters).
    pub radius: f32,

    /// Standing height (meters).
    pub standing_height: f32,

    /// Crouching height (meters).
    pub crouch_height: f32,

    /// Sliding height (meters).
    pub slide_height: f32,

    /// Eye height when standing (meters from feet).
    pub eye_height_standing: f32,

    /// Eye height when crouching (meters from feet).
    pub eye_height_crouching: f32,

    /// Eye height when sliding (meters from feet).
    pub eye_height_sliding: f32,

    /// How quickly the eye follows its target height (1/s).
    pub eye_lerp_rate: f32,

    /// Lips lower than this are walked over instead of blocking.
    pub step_height: f32,

    // ========================================================================
    // Speeds
    // ========================================================================
    /// Walking speed (meters/second).
    pub walk_speed: f32,

    /// Sprinting speed (meters/second).
    pub sprint_speed: f32,

    /// Crouch-walking speed (meters/second).
    pub crouch_speed: f32,

    // ========================================================================
    // Physics
    // ========================================================================
    /// Gravity acceleration (meters/second²).
    pub gravity: f32,

    /// Vertical launch velocity of a jump (meters/second).
    pub jump_force: f32,

    /// Maximum falling speed (meters/second).
    pub terminal_velocity: f32,

    /// Smoothing rate toward the target velocity while input is held (1/s).
    pub ground_accel_rate: f32,

    /// Smoothing rate toward rest when input is released (1/s).
    pub ground_decel_rate: f32,

    /// Fraction of the ground rates available in the air (0.0 to 1.0).
    pub air_control: f32,

    // ========================================================================
    // Jump Timing (seconds)
    // ========================================================================
    /// Minimum time between jumps.
    pub jump_cooldown: f32,

    /// Grace period after walking off an edge during which a jump still works.
    pub coyote_time: f32,

    /// How long a jump press is remembered before landing.
    pub jump_buffer: f32,

    // ========================================================================
    // Sliding
    // ========================================================================
    /// Minimum speed a slide starts with (meters/second).
    pub slide_speed: f32,

    /// Extra speed added when a slide starts (meters/second).
    pub slide_boost: f32,

    /// The slide ends below this speed (meters/second).
    pub slide_min_speed: f32,

    /// Exponential decay rate of slide speed (1/s).
    pub slide_friction: f32,

    /// Scales the downhill pull of gravity while sliding on a slope.
    pub slide_slope_factor: f32,

    /// Longest possible slide (seconds).
    pub slide_max_time: f32,

    /// Delay before another slide may start (seconds).
    pub slide_cooldown: f32,

    /// Continuous sprint needed before crouch turns into a slide (seconds).
    pub min_sprint_for_slide: f32,

    // ========================================================================
    // Wall Running
    // ========================================================================
    /// Speed along the wall while wall-running (meters/second).
    pub wall_run_speed: f32,

    /// Minimum speed along the wall needed to attach (meters/second).
    pub wall_run_min_speed: f32,

    /// Longest possible wall-run (seconds).
    pub wall_run_max_time: f32,

    /// Delay before re-attaching to a wall (seconds).
    pub wall_run_cooldown: f32,

    /// Upward velocity given on attach (meters/second).
    pub wall_run_boost: f32,

    /// Decay rate of vertical velocity while wall-running (1/s).
    pub wall_run_vertical_damping: f32,

    /// Horizontal push away from the wall on a wall jump (meters/second).
    pub wall_jump_push: f32,

    /// Surfaces with `|normal.y|` at or above this are not walls.
    pub wall_normal_max_y: f32,

    /// How far past the body radius walls are searched for (meters).
    pub wall_probe_distance: f32,

    /// Number of horizontal wall rays (4 or 8).
    pub wall_probe_rays: u32,

    // ========================================================================
    // Probing
    // ========================================================================
    /// Extra reach of landing rays below the fall distance (meters).
    pub ground_probe_distance: f32,

    /// Grounded bodies stick to surfaces this far below their feet (meters).
    pub ground_snap_distance: f32,

    /// Rings of ground samples around the footprint center.
    pub ground_sample_rings: u32,

    /// Upper bound on a single tick's elapsed time (seconds).
    pub max_delta: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            // Body
            radius: 0.4,
            standing_height: 1.8,
            crouch_height: 1.0,
            slide_height: 0.8,
            eye_height_standing: 1.6,
            eye_height_crouching: 0.8,
            eye_height_sliding: 0.6,
            eye_lerp_rate: 12.0,
            step_height: 0.3,

            // Speeds
            walk_speed: 7.0,
            sprint_speed: 12.0,
            crouch_speed: 3.5,

            // Physics
            gravity: 24.0,
            jump_force: 10.0,  // ~2.1m apex, 0.83s flat airtime
            terminal_velocity: 40.0,
            ground_accel_rate: 12.0,
            ground_decel_rate: 10.0,
            air_control: 0.3,

            // Jump timing
            jump_cooldown: 0.2,
            coyote_time: 0.15,
            jump_buffer: 0.15,

            // Sliding
            slide_speed: 13.0,
            slide_boost: 2.0,
            slide_min_speed: 4.0,
            slide_friction: 1.2,
            slide_slope_factor: 1.0,
            slide_max_time: 1.5,
            slide_cooldown: 0.5,
            min_sprint_for_slide: 0.3,

            // Wall running
            wall_run_speed: 12.0,
            wall_run_min_speed: 6.0,
            wall_run_max_time: 1.5,
            wall_run_cooldown: 0.4,
            wall_run_boost: 2.0,
            wall_run_vertical_damping: 4.0,
            wall_jump_push: 7.0,
            wall_normal_max_y: 0.3,
            wall_probe_distance: 0.6,
            wall_probe_rays: 8,

            // Probing
            ground_probe_distance: 0.05,
            ground_snap_distance: 0.3,
            ground_sample_rings: 2,
            max_delta: 0.1,
        }
    }
}

impl MovementConfig {
    /// Low gravity, long hang time, generous air control.
    pub fn floaty() -> Self {
        Self {
            gravity: 16.0,
            jump_force: 8.5,
            air_control: 0.5,
            coyote_time: 0.2,
            wall_run_max_time: 2.0,
            ..Default::default()
        }
    }

    /// Heavy gravity and snappy acceleration.
    pub fn tight() -> Self {
        Self {
            gravity: 32.0,
            jump_force: 12.0,
            terminal_velocity: 50.0,
            ground_accel_rate: 20.0,
            ground_decel_rate: 18.0,
            air_control: 0.2,
            coyote_time: 0.1,
            jump_buffer: 0.1,
            ..Default::default()
        }
    }

    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("radius", self.radius),
            ("standing_height", self.standing_height),
            ("crouch_height", self.crouch_height),
            ("slide_height", self.slide_height),
            ("eye_lerp_rate", self.eye_lerp_rate),
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
            ("crouch_speed", self.crouch_speed),
            ("gravity", self.gravity),
            ("jump_force", self.jump_force),
            ("terminal_velocity", self.terminal_velocity),
            ("ground_accel_rate", self.ground_accel_rate),
            ("ground_decel_rate", self.ground_decel_rate),
            ("slide_speed", self.slide_speed),
            ("slide_min_speed", self.slide_min_speed),
            ("slide_max_time", self.slide_max_time),
            ("wall_run_speed", self.wall_run_speed),
            ("wall_run_max_time", self.wall_run_max_time),
            ("wall_probe_distance", self.wall_probe_distance),
            ("ground_snap_distance", self.ground_snap_distance),
            ("max_delta", self.max_delta),
        ] {
            require_positive(field, value)?;
        }

        if self.crouch_height >= self.standing_height {
            return Err(ConfigError::invalid(
                "crouch_height",
                "must be lower than standing_height",
            ));
        }
        if self.slide_height > self.crouch_height {
            return Err(ConfigError::invalid(
                "slide_height",
                "must not exceed crouch_height",
            ));
        }
        if !(0.0..self.slide_height).contains(&self.step_height) {
            return Err(ConfigError::invalid(
                "step_height",
                "must be in [0, slide_height)",
            ));
        }
        for (field, eye, height) in [
            ("eye_height_standing", self.eye_height_standing, self.standing_height),
            ("eye_height_crouching", self.eye_height_crouching, self.crouch_height),
            ("eye_height_sliding", self.eye_height_sliding, self.slide_height),
        ] {
            if !(0.0..=height).contains(&eye) {
                return Err(ConfigError::invalid(field, "must lie within the body height"));
            }
        }
        if !(0.0..=1.0).contains(&self.air_control) {
            return Err(ConfigError::invalid("air_control", "must be in [0, 1]"));
        }
        if self.slide_min_speed >= self.slide_speed {
            return Err(ConfigError::invalid(
                "slide_min_speed",
                "must be lower than slide_speed",
            ));
        }
        if !(self.wall_normal_max_y > 0.0 && self.wall_normal_max_y < 1.0) {
            return Err(ConfigError::invalid("wall_normal_max_y", "must be in (0, 1)"));
        }
        if !matches!(self.wall_probe_rays, 4 | 8) {
            return Err(ConfigError::invalid(
                "wall_probe_rays",
                format!("must be 4 or 8, got {}", self.wall_probe_rays),
            ));
        }
        for (field, value) in [
            ("jump_cooldown", self.jump_cooldown),
            ("coyote_time", self.coyote_time),
            ("jump_buffer", self.jump_buffer),
            ("slide_cooldown", self.slide_cooldown),
            ("wall_run_cooldown", self.wall_run_cooldown),
            ("ground_probe_distance", self.ground_probe_distance),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(ConfigError::invalid(field, "must be >= 0"));
            }
        }

        Ok(())
    }

    /// Target horizontal speed for a mode.
    pub fn target_speed(&self, mode: MovementMode, sprinting: bool) -> f32 {
        match mode {
            MovementMode::Crouching => self.crouch_speed,
            MovementMode::Sliding => self.slide_speed,
            _ if sprinting => self.sprint_speed,
            _ => self.walk_speed,
        }
    }

    /// Body height for a mode.
    pub fn height(&self, mode: MovementMode) -> f32 {
        match mode {
            MovementMode::Crouching => self.crouch_height,
            MovementMode::Sliding => self.slide_height,
            _ => self.standing_height,
        }
    }

    /// Eye height for a mode.
    pub fn eye_height(&self, mode: MovementMode) -> f32 {
        match mode {
            MovementMode::Crouching => self.eye_height_crouching,
            MovementMode::Sliding => self.eye_height_sliding,
            _ => self.eye_height_standing,
        }
    }

    /// Height of a jump's apex above the launch point.
    pub fn jump_apex(&self) -> f32 {
        self.jump_force * self.jump_force / (2.0 * self.gravity)
    }

    /// Time from takeoff to landing at the same height.
    pub fn flat_airtime(&self) -> f32 {
        2.0 * self.jump_force / self.gravity
    }
}
