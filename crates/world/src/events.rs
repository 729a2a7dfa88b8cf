//! Events emitted by the world systems.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::chunk::ChunkIndex;
use crate::platform::CheckpointId;

/// A discrete change in the streamed world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// A chunk was generated and its obstacles became collidable.
    ChunkGenerated {
        index: ChunkIndex,
        /// Entry point of the chunk.
        position: Vec3,
        /// Exit height of the chunk.
        height: f32,
    },
    /// A chunk and its obstacles were released.
    ChunkDisposed { index: ChunkIndex },
    /// The traveler reached a checkpoint that was not already active.
    CheckpointReached {
        id: CheckpointId,
        /// Center of the checkpoint's top surface.
        position: Vec3,
    },
}

impl WorldEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorldEvent::ChunkGenerated { .. } => "chunk:generated",
            WorldEvent::ChunkDisposed { .. } => "chunk:disposed",
            WorldEvent::CheckpointReached { .. } => "checkpoint:reached",
        }
    }
}
