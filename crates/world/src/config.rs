//! World generation tuning.
//!
//! Gap limits are not free parameters: they are derived from the movement
//! controller's jump reach so that every generated gap can be crossed by a
//! sprinting jump.

use glam::Vec3;
use parkour_physics::{ConfigError, MovementConfig};
use serde::{Deserialize, Serialize};

use crate::reach::JumpReach;

/// Fraction of the flat jump reach used as the smallest gap.
const MIN_GAP_FRACTION: f32 = 0.35;

/// Fraction of the flat jump reach used as the largest gap.
const MAX_GAP_FRACTION: f32 = 0.85;

/// Configuration for the chunk generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    // ========================================================================
    // Chunk Shape
    // ========================================================================
    /// Longitudinal length of one chunk (meters).
    pub chunk_length: f32,

    /// Smallest edge-to-edge gap between consecutive platforms (meters).
    pub min_edge_gap: f32,

    /// Largest edge-to-edge gap between consecutive platforms (meters).
    pub max_edge_gap: f32,

    /// Platforms before a ramp, bounce pad or wall-run are at least this long,
    /// and gaps wider than the mid gap need a launch platform this long.
    pub min_runway: f32,

    // ========================================================================
    // Platform Sizes
    // ========================================================================
    pub platform_min_width: f32,
    pub platform_max_width: f32,
    pub platform_min_length: f32,
    pub platform_max_length: f32,

    /// Side length range of stepping stones.
    pub stone_min_size: f32,
    pub stone_max_size: f32,

    /// Thickness of every walkable slab.
    pub platform_thickness: f32,

    // ========================================================================
    // Heights
    // ========================================================================
    /// Largest rise between consecutive platforms reached by a plain jump.
    pub max_step_up: f32,

    /// Largest drop between consecutive platforms.
    pub max_step_down: f32,

    /// A chunk's exit never differs from its entry by more than this.
    pub max_height_delta: f32,

    /// Global lower bound on platform tops.
    pub min_height: f32,

    /// Global upper bound on platform tops.
    pub max_height: f32,

    // ========================================================================
    // Heading
    // ========================================================================
    /// Largest heading change between two chunks (radians).
    pub max_turn: f32,

    /// The accumulated heading stays within ±this (radians).
    pub max_heading: f32,

    // ========================================================================
    // Features
    // ========================================================================
    /// Footprints are grown by this much before the overlap test (meters).
    pub overlap_buffer: f32,

    /// Every Nth chunk starts with a checkpoint (0 disables checkpoints).
    pub checkpoint_every: u32,

    pub checkpoint_width: f32,
    pub checkpoint_length: f32,

    /// Launch velocity of bounce pads (meters/second).
    pub bounce_force: f32,

    /// Fraction of the computed jump reach a gap may use.
    pub reach_safety: f32,

    /// Height of wall-run walls above the launch platform.
    pub wall_height: f32,

    /// Lateral distance from the path centerline to a wall's face.
    pub wall_offset: f32,

    /// Seed for the layout random stream.
    pub seed: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::for_movement(&MovementConfig::default())
    }
}

impl GeneratorConfig {
    /// Derive gap and height limits from a movement tuning.
    ///
    /// Gaps span 35% to 85% of the flat sprint-jump reach; a plain step up is
    /// at most 70% of the jump apex and bounce pads launch 1.6 times harder
    /// than a jump.
    pub fn for_movement(movement: &MovementConfig) -> Self {
        let reach = JumpReach::from_movement(movement);
        let flat = reach.flat_distance();

        Self {
            chunk_length: 50.0,
            min_edge_gap: flat * MIN_GAP_FRACTION,
            max_edge_gap: flat * MAX_GAP_FRACTION,
            min_runway: 6.0,

            platform_min_width: 2.5,
            platform_max_width: 5.0,
            platform_min_length: 3.0,
            platform_max_length: 10.0,
            stone_min_size: 2.0,
            stone_max_size: 3.0,
            platform_thickness: 1.0,

            max_step_up: reach.apex() * 0.7,
            max_step_down: 4.0,
            max_height_delta: 4.0,
            min_height: -4.0,
            max_height: 12.0,

            max_turn: 0.2,
            max_heading: 0.6,

            overlap_buffer: 0.25,
            checkpoint_every: 3,
            checkpoint_width: 8.0,
            checkpoint_length: 6.0,
            bounce_force: movement.jump_force * 1.6,
            reach_safety: MAX_GAP_FRACTION,
            wall_height: 3.5,
            wall_offset: 1.2,
            seed: 1,
        }
    }

    /// Same limits with a different seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// The gap between min and max, used when the launch platform is short.
    pub fn mid_gap(&self) -> f32 {
        (self.min_edge_gap + self.max_edge_gap) * 0.5
    }

    /// Reject values the generator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("chunk_length", self.chunk_length),
            ("min_edge_gap", self.min_edge_gap),
            ("max_edge_gap", self.max_edge_gap),
            ("platform_min_width", self.platform_min_width),
            ("platform_min_length", self.platform_min_length),
            ("stone_min_size", self.stone_min_size),
            ("platform_thickness", self.platform_thickness),
            ("checkpoint_width", self.checkpoint_width),
            ("checkpoint_length", self.checkpoint_length),
            ("bounce_force", self.bounce_force),
            ("reach_safety", self.reach_safety),
            ("wall_height", self.wall_height),
        ] {
            require_positive(field, value)?;
        }

        for (field, min, max) in [
            ("max_edge_gap", self.min_edge_gap, self.max_edge_gap),
            ("platform_max_width", self.platform_min_width, self.platform_max_width),
            ("platform_max_length", self.platform_min_length, self.platform_max_length),
            ("stone_max_size", self.stone_min_size, self.stone_max_size),
            ("max_height", self.min_height, self.max_height),
        ] {
            if max < min {
                return Err(ConfigError::invalid(field, "must not be below its minimum"));
            }
        }

        if self.reach_safety > 1.0 {
            return Err(ConfigError::invalid("reach_safety", "must be in (0, 1]"));
        }
        if self.overlap_buffer < 0.0 || self.max_step_up < 0.0 || self.max_step_down < 0.0 {
            return Err(ConfigError::invalid(
                "overlap_buffer",
                "buffers and step limits must be >= 0",
            ));
        }
        if self.max_turn < 0.0 || self.max_heading < 0.0 {
            return Err(ConfigError::invalid("max_turn", "heading limits must be >= 0"));
        }

        let smallest_slot = self.min_edge_gap + self.platform_min_length.min(self.stone_min_size);
        if self.chunk_length < smallest_slot {
            return Err(ConfigError::invalid(
                "chunk_length",
                format!("must fit at least one gap and platform ({smallest_slot:.2} m)"),
            ));
        }

        Ok(())
    }

    /// Check the gap limits against what a controller can actually jump.
    pub fn validate_reach(&self, movement: &MovementConfig) -> Result<(), ConfigError> {
        let reach = JumpReach::from_movement(movement).flat_distance();
        if self.max_edge_gap > reach {
            return Err(ConfigError::invalid(
                "max_edge_gap",
                format!("{:.2} m exceeds the sprint jump reach of {reach:.2} m", self.max_edge_gap),
            ));
        }
        if self.max_step_up >= movement.jump_apex() {
            return Err(ConfigError::invalid(
                "max_step_up",
                "must be below the jump apex",
            ));
        }
        Ok(())
    }
}

/// Configuration for the streaming window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunks kept generated ahead of the traveler.
    pub lookahead_chunks: u32,

    /// Chunks kept alive behind the traveler.
    pub trailing_chunks: u32,

    /// Hard limit on live chunks. Past it the oldest chunk is disposed even
    /// when an active checkpoint pins it.
    pub max_live_chunks: u32,

    /// Length of the safe starting platform (meters).
    pub start_platform_length: f32,

    /// Width of the safe starting platform (meters).
    pub start_platform_width: f32,

    /// Easy platforms following the start platform.
    pub easy_platforms: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            lookahead_chunks: 3,
            trailing_chunks: 2,
            max_live_chunks: 24,
            start_platform_length: 20.0,
            start_platform_width: 12.0,
            easy_platforms: 3,
        }
    }
}

impl StreamingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookahead_chunks == 0 {
            return Err(ConfigError::invalid("lookahead_chunks", "must be at least 1"));
        }
        // Room for the window, the traveler's own chunk and one pinned chunk
        if self.max_live_chunks < self.lookahead_chunks + self.trailing_chunks + 2 {
            return Err(ConfigError::invalid(
                "max_live_chunks",
                "must cover lookahead_chunks + trailing_chunks + 2",
            ));
        }
        require_positive("start_platform_length", self.start_platform_length)?;
        require_positive("start_platform_width", self.start_platform_width)
    }
}

/// Configuration for checkpoints and death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Respawn height above the checkpoint surface.
    pub respawn_offset: f32,

    /// Extra longitudinal reach of the activation box beyond the platform.
    pub longitudinal_margin: f32,

    /// Extra lateral reach of the activation box beyond the platform.
    pub lateral_tolerance: f32,

    /// Height of the activation band above the surface.
    pub vertical_band: f32,

    /// Falling below this height kills the traveler.
    pub death_height: f32,

    /// Minimum time between two respawns (seconds).
    pub respawn_cooldown: f32,

    /// Respawn position used before any checkpoint is active.
    pub default_spawn: Vec3,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            respawn_offset: 0.5,
            longitudinal_margin: 1.0,
            lateral_tolerance: 1.5,
            vertical_band: 3.0,
            death_height: -15.0,
            respawn_cooldown: 1.0,
            default_spawn: Vec3::ZERO,
        }
    }
}

impl CheckpointConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("vertical_band", self.vertical_band)?;
        if self.respawn_offset < 0.0 || self.respawn_cooldown < 0.0 {
            return Err(ConfigError::invalid(
                "respawn_offset",
                "offset and cooldown must be >= 0",
            ));
        }
        if self.default_spawn.y <= self.death_height {
            return Err(ConfigError::invalid(
                "default_spawn",
                "must lie above death_height",
            ));
        }
        Ok(())
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {value}")))
    }
}
