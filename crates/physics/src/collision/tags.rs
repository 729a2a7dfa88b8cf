//! Gameplay tags attached to obstacles.
//!
//! Tags do not change how an obstacle collides. They tell the controller and
//! the checkpoint system what should happen when the body touches it.

use serde::{Deserialize, Serialize};

/// Optional metadata carried by an obstacle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleTags {
    /// Landing on this surface while descending launches the body upward
    /// with this vertical velocity (meters/second).
    pub bounce_force: Option<f32>,

    /// Checkpoint identifier if this surface belongs to a checkpoint.
    pub checkpoint: Option<u32>,
}

impl ObstacleTags {
    /// No tags.
    pub const NONE: Self = Self {
        bounce_force: None,
        checkpoint: None,
    };

    /// Tags for a bounce pad.
    pub fn bouncy(force: f32) -> Self {
        Self {
            bounce_force: Some(force),
            ..Self::NONE
        }
    }

    /// Tags for a checkpoint surface.
    pub fn checkpoint(id: u32) -> Self {
        Self {
            checkpoint: Some(id),
            ..Self::NONE
        }
    }

    /// Whether landing here should bounce.
    #[inline]
    pub fn is_bouncy(&self) -> bool {
        self.bounce_force.is_some()
    }
}
