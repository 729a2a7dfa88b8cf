//! Collidable obstacles.

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Real};
use parry3d::na::{Quaternion, Translation3, UnitQuaternion};
use parry3d::shape::SharedShape;
use serde::{Deserialize, Serialize};

use super::tags::ObstacleTags;

/// Identifier of an obstacle inside a [`super::CollisionWorld`].
pub type ObstacleId = u32;

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Bounds spanning `min..=max`.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Bounds around a center point.
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Bounds of a segment from `start` to `end`.
    pub fn from_segment(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end)
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// Whether the two boxes share any volume (touching counts).
    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Whether `point` lies inside the box.
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// A solid box in the world.
///
/// The box may be rotated about the vertical axis (platform heading) and
/// tilted about its own lateral axis (ramps). Ray and overlap queries go
/// through parry3d; the cached [`Bounds`] are used for cheap rejection.
#[derive(Debug, Clone)]
pub struct Obstacle {
    /// Identifier, unique within the world that holds the obstacle.
    pub id: ObstacleId,

    /// Center of the box in world space.
    pub center: Vec3,

    /// Half-size along the box's local axes.
    pub half_extents: Vec3,

    /// Orientation of the box.
    pub rotation: Quat,

    /// World-space bounds derived from the oriented box.
    pub bounds: Bounds,

    /// Gameplay tags (bounce force, checkpoint id).
    pub tags: ObstacleTags,

    shape: SharedShape,
    transform: Isometry<Real>,
}

impl Obstacle {
    /// Create an oriented box obstacle.
    pub fn cuboid(
        id: ObstacleId,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        tags: ObstacleTags,
    ) -> Self {
        let half_extents = half_extents.abs();
        let rotation = rotation.normalize();
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        let transform = Isometry::from_parts(
            Translation3::new(center.x, center.y, center.z),
            UnitQuaternion::new_normalize(Quaternion::new(
                rotation.w, rotation.x, rotation.y, rotation.z,
            )),
        );

        Self {
            id,
            center,
            half_extents,
            rotation,
            bounds: oriented_bounds(center, half_extents, rotation),
            tags,
            shape,
            transform,
        }
    }

    /// Create an axis-aligned box obstacle.
    pub fn axis_aligned(id: ObstacleId, center: Vec3, half_extents: Vec3) -> Self {
        Self::cuboid(id, center, half_extents, Quat::IDENTITY, ObstacleTags::NONE)
    }

    /// The parry3d collision shape.
    pub fn shape(&self) -> &SharedShape {
        &self.shape
    }

    /// The parry3d placement of [`Self::shape`].
    pub fn transform(&self) -> &Isometry<Real> {
        &self.transform
    }

    /// The box's local up axis in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

fn oriented_bounds(center: Vec3, half_extents: Vec3, rotation: Quat) -> Bounds {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                let corner = center + rotation * (half_extents * Vec3::new(sx, sy, sz));
                min = min.min(corner);
                max = max.max(corner);
            }
        }
    }
    Bounds { min, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_axis_aligned_bounds() {
        let obstacle = Obstacle::axis_aligned(0, Vec3::new(0.0, -0.5, 0.0), Vec3::new(2.0, 0.5, 3.0));
        assert_eq!(obstacle.bounds.min, Vec3::new(-2.0, -1.0, -3.0));
        assert_eq!(obstacle.bounds.max, Vec3::new(2.0, 0.0, 3.0));
    }

    #[test]
    fn test_rotated_bounds_swap_axes() {
        let obstacle = Obstacle::cuboid(
            0,
            Vec3::ZERO,
            Vec3::new(1.0, 0.5, 4.0),
            Quat::from_rotation_y(FRAC_PI_2),
            ObstacleTags::NONE,
        );
        let size = obstacle.bounds.size();
        assert!((size.x - 8.0).abs() < 1e-4, "size={size:?}");
        assert!((size.z - 2.0).abs() < 1e-4, "size={size:?}");
    }

    #[test]
    fn test_bounds_intersection() {
        let a = Bounds::from_center(Vec3::ZERO, Vec3::ONE);
        let b = Bounds::from_center(Vec3::new(1.5, 0.0, 0.0), Vec3::ONE);
        let c = Bounds::from_center(Vec3::new(3.0, 0.0, 0.0), Vec3::splat(0.5));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(Vec3::new(0.5, -0.5, 0.9)));
    }
}
