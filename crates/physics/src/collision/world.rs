//! The live obstacle set.
//!
//! Obstacles arrive in batches owned by a path chunk and leave in the same
//! order, so the world keeps them in a deque with a span per owner. Adding a
//! chunk appends, disposing the oldest chunk pops from the front; neither
//! scans the whole set.

use std::collections::VecDeque;

use glam::Vec3;
use parry3d::math::{Isometry, Point, Vector};
use parry3d::query::{contact, Ray};
use parry3d::shape::SharedShape;

use super::obstacle::{Bounds, Obstacle, ObstacleId};
use super::probe::ProbeHit;

/// Ids handed out by [`CollisionWorld::add_box`] start here so they never
/// collide with ids chosen by chunk owners.
const STATIC_ID_BASE: ObstacleId = 1 << 31;

#[derive(Debug, Clone, Copy)]
struct Span {
    owner: u64,
    len: usize,
}

/// Every obstacle the controller can collide with.
#[derive(Debug)]
pub struct CollisionWorld {
    /// Obstacles not owned by any chunk (test fixtures, hand-built arenas).
    statics: Vec<Obstacle>,
    /// Chunk-owned obstacles in generation order.
    streamed: VecDeque<Obstacle>,
    /// One entry per owning chunk, same order as `streamed`.
    spans: VecDeque<Span>,
    next_static_id: ObstacleId,
}

impl CollisionWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            statics: Vec::new(),
            streamed: VecDeque::new(),
            spans: VecDeque::new(),
            next_static_id: STATIC_ID_BASE,
        }
    }

    /// Add a static axis-aligned box.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) -> ObstacleId {
        let id = self.next_static_id;
        self.next_static_id += 1;
        self.statics.push(Obstacle::axis_aligned(id, center, half_extents));
        id
    }

    /// Add a prebuilt static obstacle, keeping its id.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = obstacle.id;
        self.statics.push(obstacle);
        id
    }

    /// Append the obstacles owned by chunk `owner`.
    pub fn push_chunk(&mut self, owner: u64, obstacles: impl IntoIterator<Item = Obstacle>) {
        let before = self.streamed.len();
        self.streamed.extend(obstacles);
        self.spans.push_back(Span {
            owner,
            len: self.streamed.len() - before,
        });
    }

    /// Remove every obstacle owned by chunk `owner`.
    ///
    /// Returns the number of obstacles released. The oldest owner is removed
    /// from the front in O(len); any other owner falls back to a span walk.
    pub fn pop_chunk(&mut self, owner: u64) -> usize {
        if let Some(front) = self.spans.front().copied() {
            if front.owner == owner {
                self.spans.pop_front();
                self.streamed.drain(..front.len);
                return front.len;
            }
        }

        let mut offset = 0;
        for index in 0..self.spans.len() {
            let span = self.spans[index];
            if span.owner == owner {
                self.spans.remove(index);
                self.streamed.drain(offset..offset + span.len);
                return span.len;
            }
            offset += span.len;
        }

        log::debug!("pop_chunk: owner {owner} has no obstacles in the world");
        0
    }

    /// Remove all chunk-owned obstacles, keeping statics.
    pub fn clear_streamed(&mut self) {
        self.streamed.clear();
        self.spans.clear();
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.statics.clear();
        self.clear_streamed();
    }

    /// Number of obstacles in the world.
    pub fn len(&self) -> usize {
        self.statics.len() + self.streamed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of chunk owners currently contributing obstacles.
    pub fn chunk_count(&self) -> usize {
        self.spans.len()
    }

    /// Iterate every obstacle, statics first.
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.statics.iter().chain(self.streamed.iter())
    }

    /// Cast a ray and return the nearest surface it hits.
    ///
    /// # Arguments
    ///
    /// * `origin` - Ray starting position
    /// * `direction` - Ray direction (will be normalized)
    /// * `max_distance` - Maximum trace distance
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );
        let segment = Bounds::from_segment(origin, origin + dir * max_distance);

        let mut closest: Option<(f32, &Obstacle)> = None;
        for obstacle in self.iter() {
            if !obstacle.bounds.intersects(&segment) {
                continue;
            }

            if let Some(toi) = obstacle
                .shape()
                .cast_ray(obstacle.transform(), &ray, max_distance, true)
            {
                let is_closer = closest.map_or(true, |(best, _)| toi < best);
                if is_closer {
                    closest = Some((toi, obstacle));
                }
            }
        }

        let (distance, obstacle) = closest?;
        let normal = hit_normal(&ray, distance, obstacle, dir);

        Some(ProbeHit {
            point: origin + dir * distance,
            normal,
            distance,
            obstacle: obstacle.id,
            tags: obstacle.tags,
        })
    }

    /// Find an obstacle penetrating the given axis-aligned box.
    ///
    /// Touching surfaces do not count, only actual penetration.
    pub fn overlapping(&self, center: Vec3, half_extents: Vec3) -> Option<ObstacleId> {
        let query = Bounds::from_center(center, half_extents);
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        let transform = Isometry::translation(center.x, center.y, center.z);

        for obstacle in self.iter() {
            if !obstacle.bounds.intersects(&query) {
                continue;
            }

            if let Ok(Some(found)) = contact(
                &transform,
                shape.as_ref(),
                obstacle.transform(),
                obstacle.shape().as_ref(),
                0.0,
            ) {
                if found.dist < 0.0 {
                    return Some(obstacle.id);
                }
            }
        }

        None
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn hit_normal(ray: &Ray, toi: f32, obstacle: &Obstacle, dir: Vec3) -> Vec3 {
    match obstacle
        .shape()
        .cast_ray_and_get_normal(obstacle.transform(), ray, toi + 0.01, true)
    {
        Some(intersection) => Vec3::new(
            intersection.normal.x,
            intersection.normal.y,
            intersection.normal.z,
        ),
        None => -dir,
    }
}

// ============================================================================
// Tests
// ============================================================================
