//! Collision queries for the movement controller.
//!
//! The world is a flat collection of box-shaped obstacles (oriented and
//! optionally inclined). Movement never sweeps shapes through it; it casts
//! short rays and runs overlap tests:
//!
//! - [`CollisionProbe::ground`]: downward rays around the footprint, highest
//!   walkable hit wins (handles ramps and rotated platforms)
//! - [`CollisionProbe::ceiling`]: upward rays from the head
//! - [`CollisionProbe::wall`]: outward rays at mid-body height, only mostly
//!   vertical surfaces count as walls
//! - [`CollisionProbe::can_stand`]: upward rays from crouch to standing height
//!
//! An empty world answers every query with "no hit".

mod obstacle;
mod probe;
mod tags;
mod world;

pub use obstacle::{Bounds, Obstacle, ObstacleId};
pub use probe::{CollisionProbe, GroundHit, ProbeHit, WallHit};
pub use tags::ObstacleTags;
pub use world::CollisionWorld;
