//! Parkour Game
//!
//! This crate ties the parkour core together:
//!
//! - Input conversion (keys, stick, just-pressed edges)
//! - The simulation context (movement, streaming, checkpoints, death)
//! - The event bus external collaborators subscribe to
//! - Configuration loading
//!
//! # Architecture
//!
//! Every tick runs the same fixed pipeline. Rendering, audio and UI live
//! outside and only read state or listen to events.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Simulation                            │
//! │  ┌─────────┐    ┌──────────┐    ┌────────────────────────┐  │
//! │  │ Player  │───►│ Movement │───►│ World                  │  │
//! │  │ Input   │    │ (probes, │    │ (chunk streaming,      │  │
//! │  └─────────┘    │  modes)  │    │  checkpoints, death)   │  │
//! │                 └──────────┘    └────────────────────────┘  │
//! │                        │                   │                 │
//! │                        └──────► EventBus ◄─┘                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod autopilot;
pub mod config;
pub mod events;
pub mod input;
pub mod simulation;

// Re-export main types
pub use autopilot::Autopilot;
pub use config::{LoadError, ResetMode, SimulationConfig};
pub use events::{EventBus, GameEvent, SubscriptionId};
pub use input::{ActionInput, InputTracker, MoveKeys, PlayerInput};
pub use simulation::{RunStats, Simulation};

// Re-export core types for convenience
pub use parkour_physics::{KinematicBody, MovementConfig, MovementEvent, MovementMode};
pub use parkour_world::{ChunkManager, CheckpointSystem, WorldEvent};
