//! Parkour Physics
//!
//! A kinematic character controller for first-person parkour. The body is not
//! simulated by a rigid-body solver; instead every tick the controller resolves
//! input into velocity, integrates it one axis at a time and probes the world
//! with rays to find ground, ceilings and runnable walls.
//!
//! # Architecture
//!
//! - **Collision**: a flat set of obstacles plus ray/overlap queries against it
//! - **Movement**: the movement state machine (grounded, airborne, crouching,
//!   sliding, wall-running) built on top of those queries
//!
//! Nothing here owns the obstacle set long-term. The world crate streams
//! obstacles in and out of a [`CollisionWorld`]; the controller only borrows it
//! for the duration of one update.

pub mod collision;
mod error;
pub mod movement;

pub use collision::{
    Bounds, CollisionProbe, CollisionWorld, GroundHit, Obstacle, ObstacleId, ObstacleTags,
    ProbeHit, WallHit,
};
pub use error::ConfigError;
pub use movement::{
    ActionSet, KinematicBody, MovementConfig, MovementController, MovementEvent, MovementInput,
    MovementMode, Timers,
};
