//! Ray-based queries used by the movement controller.

use std::f32::consts::FRAC_PI_4;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::obstacle::ObstacleId;
use super::tags::ObstacleTags;
use super::world::CollisionWorld;

/// Surfaces whose normal points up at least this much count as ground.
pub const MIN_GROUND_NORMAL_Y: f32 = 0.6;

/// Footprint samples are pulled slightly inside the body radius so rays never
/// start on the face of a wall the body is touching.
const FOOTPRINT_INSET: f32 = 0.9;

/// Hits closer than this started inside the obstacle and are ignored.
const INSIDE_EPSILON: f32 = 1e-4;

/// Nearest surface found by a single ray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeHit {
    /// World-space impact point.
    pub point: Vec3,
    /// Surface normal at the impact point.
    pub normal: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Obstacle that was hit.
    pub obstacle: ObstacleId,
    /// Tags of the obstacle that was hit.
    pub tags: ObstacleTags,
}

/// Result of a ground query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundHit {
    /// Height of the highest walkable surface under the footprint.
    pub height: f32,
    /// Normal of that surface.
    pub normal: Vec3,
    pub obstacle: ObstacleId,
    pub tags: ObstacleTags,
}

impl GroundHit {
    /// Whether the ground is inclined (ramp) rather than flat.
    pub fn is_slope(&self) -> bool {
        self.normal.y < 0.999
    }
}

/// Result of a wall query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallHit {
    pub point: Vec3,
    /// Horizontal-ish normal pointing away from the wall.
    pub normal: Vec3,
    pub distance: f32,
    pub obstacle: ObstacleId,
}

/// Borrowed view of a [`CollisionWorld`] answering movement queries.
///
/// All positions are feet positions (bottom center of the body) unless noted.
#[derive(Debug, Clone, Copy)]
pub struct CollisionProbe<'w> {
    world: &'w CollisionWorld,
}

impl<'w> CollisionProbe<'w> {
    pub fn new(world: &'w CollisionWorld) -> Self {
        Self { world }
    }

    /// Nearest hit along a ray, or `None` when nothing is within range.
    pub fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit> {
        self.world.raycast(origin, direction, max_distance)
    }

    /// Highest walkable surface below the footprint.
    ///
    /// Rays are cast straight down from `origin` and from `rings` concentric
    /// rings of eight points around it. Casting from above the feet lets the
    /// caller find surfaces the body has slightly sunk into.
    ///
    /// # Arguments
    ///
    /// * `origin` - Center of the footprint at the height rays start from
    /// * `radius` - Body radius
    /// * `rings` - Number of sample rings (0 samples only the center)
    /// * `max_distance` - How far down rays reach
    pub fn ground(
        &self,
        origin: Vec3,
        radius: f32,
        rings: u32,
        max_distance: f32,
    ) -> Option<GroundHit> {
        let mut best: Option<GroundHit> = None;

        for sample in footprint(origin, radius, rings) {
            let Some(hit) = self.cast(sample, Vec3::NEG_Y, max_distance) else {
                continue;
            };
            if hit.distance < INSIDE_EPSILON || hit.normal.y < MIN_GROUND_NORMAL_Y {
                continue;
            }

            let higher = best.map_or(true, |b| hit.point.y > b.height);
            if higher {
                best = Some(GroundHit {
                    height: hit.point.y,
                    normal: hit.normal,
                    obstacle: hit.obstacle,
                    tags: hit.tags,
                });
            }
        }

        best
    }

    /// Nearest surface above the head, if closer than `max_distance`.
    pub fn ceiling(&self, head: Vec3, radius: f32, max_distance: f32) -> Option<ProbeHit> {
        footprint(head, radius, 1)
            .filter_map(|sample| self.cast(sample, Vec3::Y, max_distance))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Nearest wall around the body at `center` (mid-body height).
    ///
    /// `rays` directions are spread evenly around the vertical axis; 4 and 8
    /// are the useful values. A hit only counts when its normal is mostly
    /// horizontal (`|normal.y| < max_normal_y`).
    pub fn wall(
        &self,
        center: Vec3,
        rays: u32,
        max_distance: f32,
        max_normal_y: f32,
    ) -> Option<WallHit> {
        let rays = rays.max(1);
        let step = std::f32::consts::TAU / rays as f32;

        (0..rays)
            .filter_map(|i| {
                let angle = i as f32 * step;
                let dir = Vec3::new(angle.sin(), 0.0, angle.cos());
                self.wall_in_direction(center, dir, max_distance, max_normal_y)
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Wall hit along one direction.
    pub fn wall_in_direction(
        &self,
        center: Vec3,
        direction: Vec3,
        max_distance: f32,
        max_normal_y: f32,
    ) -> Option<WallHit> {
        let hit = self.cast(center, direction, max_distance)?;
        if hit.distance < INSIDE_EPSILON || hit.normal.y.abs() >= max_normal_y {
            return None;
        }

        Some(WallHit {
            point: hit.point,
            normal: hit.normal,
            distance: hit.distance,
            obstacle: hit.obstacle,
        })
    }

    /// Whether the body can grow from `from_height` to `to_height`.
    pub fn can_stand(&self, feet: Vec3, radius: f32, from_height: f32, to_height: f32) -> bool {
        let clearance = to_height - from_height;
        if clearance <= 0.0 {
            return true;
        }

        let origin = feet + Vec3::Y * from_height;
        footprint(origin, radius, 1)
            .all(|sample| self.cast(sample, Vec3::Y, clearance).is_none())
    }

    /// Whether an axis-aligned box would penetrate any obstacle.
    pub fn overlaps_box(&self, center: Vec3, half_extents: Vec3) -> bool {
        self.world.overlapping(center, half_extents).is_some()
    }
}

/// Center plus `rings` rings of eight points each.
fn footprint(origin: Vec3, radius: f32, rings: u32) -> impl Iterator<Item = Vec3> {
    let outer = radius * FOOTPRINT_INSET;
    let ring_points = (1..=rings).flat_map(move |ring| {
        let r = outer * ring as f32 / rings as f32;
        (0..8).map(move |k| {
            let angle = k as f32 * FRAC_PI_4;
            origin + Vec3::new(angle.sin() * r, 0.0, angle.cos() * r)
        })
    });
    std::iter::once(origin).chain(ring_points)
}

// ============================================================================
// Tests
// ============================================================================
