//! Discrete movement events.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A movement state edge. Each is emitted once, on the tick the edge happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementEvent {
    Jump,
    /// Touched down; `impact` is the downward speed at contact.
    Land { impact: f32 },
    SprintStart,
    SprintEnd,
    CrouchStart,
    CrouchEnd,
    SlideStart,
    SlideEnd,
    /// Attached to a wall with the given outward normal.
    WallRunStart { normal: Vec3 },
    WallRunEnd,
    WallJump,
    /// Launched upward by a bouncy surface.
    Bounce { force: f32 },
}

impl MovementEvent {
    /// Stable event name for external observers.
    pub fn name(&self) -> &'static str {
        match self {
            MovementEvent::Jump => "jump",
            MovementEvent::Land { .. } => "land",
            MovementEvent::SprintStart => "sprint:start",
            MovementEvent::SprintEnd => "sprint:end",
            MovementEvent::CrouchStart => "crouch:start",
            MovementEvent::CrouchEnd => "crouch:end",
            MovementEvent::SlideStart => "slide:start",
            MovementEvent::SlideEnd => "slide:end",
            MovementEvent::WallRunStart { .. } => "wallrun:start",
            MovementEvent::WallRunEnd => "wallrun:end",
            MovementEvent::WallJump => "walljump",
            MovementEvent::Bounce { .. } => "bounce",
        }
    }
}
