//! Platform catalog.
//!
//! Every piece of generated geometry is a [`Platform`]: one footprint plus a
//! [`PlatformKind`] that decides its collision surface and tags. Platforms are
//! plain data; a chunk owns them and drops them when it is disposed.

use std::f32::consts::TAU;

use glam::{Quat, Vec2, Vec3};
use parkour_physics::{Obstacle, ObstacleId, ObstacleTags};
use serde::{Deserialize, Serialize};

/// Identifier of a platform, unique across a run.
pub type PlatformId = ObstacleId;

/// Identifier of a checkpoint, unique across a run.
pub type CheckpointId = u32;

/// Animation speed of bounce pads and active checkpoints (cycles/second).
const PULSE_RATE: f32 = 1.5;

/// What a platform is and how it behaves when touched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Flat walkable slab.
    Basic,
    /// Slab inclined along its length; the far edge is `rise` above the near one.
    Ramp { rise: f32 },
    /// Flat slab that launches a landing body upward.
    BouncePad { force: f32 },
    /// Vertical wall beside a gap, meant to be run along.
    WallRunSegment { height: f32 },
    /// Flat slab that becomes the respawn point once reached.
    Checkpoint { id: CheckpointId, active: bool },
}

impl PlatformKind {
    pub fn name(&self) -> &'static str {
        match self {
            PlatformKind::Basic => "basic",
            PlatformKind::Ramp { .. } => "ramp",
            PlatformKind::BouncePad { .. } => "bounce_pad",
            PlatformKind::WallRunSegment { .. } => "wall_run",
            PlatformKind::Checkpoint { .. } => "checkpoint",
        }
    }

    /// Whether the traveler stands on this platform (walls are not walked on).
    pub fn is_walkable(&self) -> bool {
        !matches!(self, PlatformKind::WallRunSegment { .. })
    }
}

/// Horizontal placement of a platform.
///
/// For walkable kinds `center` is the center of the top surface (for ramps,
/// halfway up the incline). For walls it is the center of the wall's base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub center: Vec3,
    /// Extent across the path (meters).
    pub width: f32,
    /// Horizontal extent along the path (meters).
    pub length: f32,
    /// Heading the length runs along (radians, 0 faces +Z).
    pub yaw: f32,
}

impl Footprint {
    /// Direction the length runs along.
    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::Z
    }

    /// Direction the width runs along.
    pub fn lateral(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::X
    }

    /// `point` relative to `center` as (lateral, up, forward).
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        let offset = point - self.center;
        Vec3::new(
            offset.dot(self.lateral()),
            offset.y,
            offset.dot(self.forward()),
        )
    }

    /// Top view rectangle grown by `buffer` on every side.
    pub fn outline(&self, buffer: f32) -> Outline {
        let forward = self.forward();
        let lateral = self.lateral();
        Outline {
            center: Vec2::new(self.center.x, self.center.z),
            axes: [
                Vec2::new(lateral.x, lateral.z),
                Vec2::new(forward.x, forward.z),
            ],
            half: Vec2::new(self.width * 0.5 + buffer, self.length * 0.5 + buffer),
        }
    }
}

/// Oriented rectangle in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub center: Vec2,
    /// Unit axes of the rectangle (lateral, forward).
    pub axes: [Vec2; 2],
    /// Half size along each axis.
    pub half: Vec2,
}

impl Outline {
    /// Separating axis test. Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &Outline) -> bool {
        let delta = other.center - self.center;
        self.axes
            .iter()
            .chain(other.axes.iter())
            .all(|axis| {
                let distance = delta.dot(*axis).abs();
                distance < self.radius_along(*axis) + other.radius_along(*axis)
            })
    }

    fn radius_along(&self, axis: Vec2) -> f32 {
        self.half.x * self.axes[0].dot(axis).abs() + self.half.y * self.axes[1].dot(axis).abs()
    }
}

/// Where a platform lies along the path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSpan {
    /// Longitudinal coordinate of the near edge.
    pub start: f32,
    /// Longitudinal coordinate of the far edge.
    pub end: f32,
    /// Sideways offset of the center from the chunk's centerline.
    pub lateral: f32,
}

/// The jump that leads onto a platform from the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Approach {
    /// Edge-to-edge longitudinal gap.
    pub gap: f32,
    /// Height of this platform's near edge above the previous far edge.
    pub rise: f32,
    /// Sideways shift between the two platform centers.
    pub lateral: f32,
    /// Vertical launch velocity available for the jump.
    pub launch_force: f32,
    /// Extra horizontal distance the jump may have to cover before the gap
    /// (the bounce pad's own length when launching off a pad).
    pub run_up: f32,
}

/// A generated piece of geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub kind: PlatformKind,
    pub footprint: Footprint,
    /// Slab thickness, or wall thickness for wall segments.
    pub thickness: f32,
    pub span: PathSpan,
    /// `None` for the first platform of a run and for walls.
    pub approach: Option<Approach>,
    phase: f32,
}

impl Platform {
    pub fn new(id: PlatformId, kind: PlatformKind, footprint: Footprint, thickness: f32) -> Self {
        Self {
            id,
            kind,
            footprint,
            thickness,
            span: PathSpan::default(),
            approach: None,
            phase: 0.0,
        }
    }

    pub fn with_span(mut self, span: PathSpan) -> Self {
        self.span = span;
        self
    }

    pub fn with_approach(mut self, approach: Approach) -> Self {
        self.approach = Some(approach);
        self
    }

    /// Tags the controller and checkpoint system react to.
    pub fn tags(&self) -> ObstacleTags {
        match self.kind {
            PlatformKind::BouncePad { force } => ObstacleTags::bouncy(force),
            PlatformKind::Checkpoint { id, .. } => ObstacleTags::checkpoint(id),
            _ => ObstacleTags::NONE,
        }
    }

    /// Orientation of the collision box.
    pub fn rotation(&self) -> Quat {
        let heading = Quat::from_rotation_y(self.footprint.yaw);
        match self.kind {
            PlatformKind::Ramp { rise } => {
                let incline = rise.atan2(self.footprint.length);
                heading * Quat::from_rotation_x(-incline)
            }
            _ => heading,
        }
    }

    /// The solid box that represents this platform in the collision world.
    pub fn collision_surface(&self) -> Obstacle {
        let footprint = &self.footprint;
        let rotation = self.rotation();

        let (center, half_extents) = match self.kind {
            PlatformKind::WallRunSegment { height } => (
                footprint.center + Vec3::Y * (height * 0.5),
                Vec3::new(footprint.width * 0.5, height * 0.5, footprint.length * 0.5),
            ),
            PlatformKind::Ramp { rise } => {
                let slope_length = (footprint.length * footprint.length + rise * rise).sqrt();
                let up = rotation * Vec3::Y;
                (
                    footprint.center - up * (self.thickness * 0.5),
                    Vec3::new(footprint.width * 0.5, self.thickness * 0.5, slope_length * 0.5),
                )
            }
            _ => (
                footprint.center - Vec3::Y * (self.thickness * 0.5),
                Vec3::new(footprint.width * 0.5, self.thickness * 0.5, footprint.length * 0.5),
            ),
        };

        Obstacle::cuboid(self.id, center, half_extents, rotation, self.tags())
    }

    /// Top height at the near edge.
    pub fn entry_height(&self) -> f32 {
        match self.kind {
            PlatformKind::Ramp { rise } => self.footprint.center.y - rise * 0.5,
            PlatformKind::WallRunSegment { height } => self.footprint.center.y + height,
            _ => self.footprint.center.y,
        }
    }

    /// Top height at the far edge.
    pub fn exit_height(&self) -> f32 {
        match self.kind {
            PlatformKind::Ramp { rise } => self.footprint.center.y + rise * 0.5,
            _ => self.entry_height(),
        }
    }

    /// Center of the far edge of the top surface.
    pub fn exit_point(&self) -> Vec3 {
        let mut point = self.footprint.center + self.footprint.forward() * (self.footprint.length * 0.5);
        point.y = self.exit_height();
        point
    }

    /// Center of the near edge of the top surface.
    pub fn entry_point(&self) -> Vec3 {
        let mut point = self.footprint.center - self.footprint.forward() * (self.footprint.length * 0.5);
        point.y = self.entry_height();
        point
    }

    /// Top view rectangle grown by `buffer`.
    pub fn outline(&self, buffer: f32) -> Outline {
        self.footprint.outline(buffer)
    }

    pub fn checkpoint_id(&self) -> Option<CheckpointId> {
        match self.kind {
            PlatformKind::Checkpoint { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_active_checkpoint(&self) -> bool {
        matches!(self.kind, PlatformKind::Checkpoint { active: true, .. })
    }

    /// Set the activation flag of a checkpoint. Other kinds ignore it.
    pub fn set_active(&mut self, value: bool) {
        if let PlatformKind::Checkpoint { active, .. } = &mut self.kind {
            *active = value;
        }
    }

    /// Advance the animation phase.
    ///
    /// Bounce pads and active checkpoints pulse; everything else is static.
    pub fn tick(&mut self, dt: f32) {
        let animated = matches!(
            self.kind,
            PlatformKind::BouncePad { .. } | PlatformKind::Checkpoint { active: true, .. }
        );
        if animated {
            self.phase = (self.phase + dt * PULSE_RATE * TAU) % TAU;
        } else {
            self.phase = 0.0;
        }
    }

    /// Animation phase in [0, 2π) for renderers.
    pub fn phase(&self) -> f32 {
        self.phase
    }
}
