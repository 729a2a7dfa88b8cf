//! Path chunks.

use glam::{Quat, Vec3};
use parkour_physics::Obstacle;
use serde::{Deserialize, Serialize};

use crate::pattern::Pattern;
use crate::platform::{CheckpointId, Platform};

/// Index of a chunk in generation order.
pub type ChunkIndex = u64;

/// Index of the start area, which holds the default spawn.
pub const START_CHUNK: ChunkIndex = 0;

/// A contiguous path segment and the platforms it owns.
///
/// Longitudinal coordinates (`start`, `end`, platform spans) are distances
/// along the path since the start of the run. Each chunk's path runs straight
/// along `heading` from `origin`; the next chunk starts at `exit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: ChunkIndex,
    pub pattern: Pattern,
    /// Longitudinal coordinate of the entry point.
    pub start: f32,
    /// Longitudinal coordinate of the exit point.
    pub end: f32,
    pub start_height: f32,
    pub end_height: f32,
    /// Accumulated heading (radians, 0 faces +Z).
    pub heading: f32,
    /// World position of the entry point.
    pub origin: Vec3,
    /// World position of the exit point (far edge of the last platform).
    pub exit: Vec3,
    pub platforms: Vec<Platform>,
    /// Checkpoint placed at the front of this chunk, if any.
    pub checkpoint: Option<CheckpointId>,
}

impl Chunk {
    /// Direction the chunk's path runs along.
    pub fn direction(&self) -> Vec3 {
        Quat::from_rotation_y(self.heading) * Vec3::Z
    }

    pub fn length(&self) -> f32 {
        self.end - self.start
    }

    /// Distance of `position` along this chunk's path, measured from `origin`.
    pub fn local_progress(&self, position: Vec3) -> f32 {
        (position - self.origin).dot(self.direction())
    }

    /// Longitudinal coordinate of `position` clamped into this chunk, or
    /// `None` when the position is behind the chunk's entry.
    pub fn progress(&self, position: Vec3) -> Option<f32> {
        let local = self.local_progress(position);
        (local >= 0.0).then(|| (self.start + local).clamp(self.start, self.end))
    }

    /// Collision surfaces of every platform.
    pub fn obstacles(&self) -> impl Iterator<Item = Obstacle> + '_ {
        self.platforms.iter().map(Platform::collision_surface)
    }

    pub fn find_checkpoint(&self, id: CheckpointId) -> Option<&Platform> {
        self.platforms
            .iter()
            .find(|platform| platform.checkpoint_id() == Some(id))
    }

    /// Walkable platforms in path order.
    pub fn walkable(&self) -> impl Iterator<Item = &Platform> {
        self.platforms
            .iter()
            .filter(|platform| platform.kind.is_walkable())
    }

    /// Advance every platform's animation.
    pub fn tick(&mut self, dt: f32) {
        for platform in &mut self.platforms {
            platform.tick(dt);
        }
    }
}
