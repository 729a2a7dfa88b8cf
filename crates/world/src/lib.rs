//! Parkour World
//!
//! Streams an endless path of platforms in front of the traveler. Every
//! layout is generated against the movement controller's own jump reach, so
//! any gap the generator produces can be crossed by a sprinting jump.
//!
//! # Architecture
//!
//! - **Platforms**: one enum of platform kinds, each with a footprint and a
//!   collision surface
//! - **Generator**: pattern-based layout of one chunk under reach, height and
//!   overlap limits
//! - **Streaming**: the sliding window of chunks and the live obstacle set
//! - **Checkpoints**: the single active respawn point and death detection
//!
//! # Determinism
//!
//! All randomness comes from [`SeededRng`]. The same seed and movement tuning
//! produce the same path.

pub mod checkpoint;
pub mod chunk;
pub mod config;
pub mod events;
pub mod generator;
pub mod pattern;
pub mod platform;
pub mod random;
pub mod reach;
pub mod streaming;

pub use checkpoint::{ActiveCheckpoint, CheckpointSystem};
pub use chunk::{Chunk, ChunkIndex, START_CHUNK};
pub use config::{CheckpointConfig, GeneratorConfig, StreamingConfig};
pub use events::WorldEvent;
pub use generator::{ChunkGenerator, ChunkRequest};
pub use pattern::Pattern;
pub use platform::{
    Approach, CheckpointId, Footprint, Outline, PathSpan, Platform, PlatformId, PlatformKind,
};
pub use random::SeededRng;
pub use reach::JumpReach;
pub use streaming::ChunkManager;
