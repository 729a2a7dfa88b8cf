//! Parkour movement.
//!
//! This module implements a kinematic first-person controller with:
//!
//! - Exponentially smoothed ground and air movement
//! - Jumping with cooldown, coyote time and jump buffering
//! - Crouching and momentum sliding
//! - Wall running and wall jumps
//! - Bounce surfaces
//!
//! # Design
//!
//! Movement is driven by the [`MovementController`], which owns the
//! [`KinematicBody`] and its [`Timers`]. Each tick it reads one
//! [`MovementInput`], moves the body through a borrowed collision world and
//! appends a [`MovementEvent`] for every state edge.

mod config;
mod controller;
mod events;
mod jump;
mod slide;
mod state;
mod wall_run;

pub use config::MovementConfig;
pub use controller::MovementController;
pub use events::MovementEvent;
pub use state::{ActionSet, KinematicBody, MovementInput, MovementMode, Timers};
