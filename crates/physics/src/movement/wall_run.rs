//! Wall running.
//!
//! While attached the body moves along the wall plane at no less than
//! `wall_run_speed`, gravity is suspended and vertical velocity decays toward
//! zero. The run lasts at most `wall_run_max_time`.

use glam::Vec3;

use crate::collision::WallHit;

use super::config::MovementConfig;
use super::state::{KinematicBody, Timers};

/// Horizontal part of `normal`, normalized.
pub(super) fn flat_normal(normal: Vec3) -> Vec3 {
    Vec3::new(normal.x, 0.0, normal.z).normalize_or_zero()
}

/// Horizontal velocity with the component into or out of the wall removed.
pub(super) fn along_wall(velocity: Vec3, normal: Vec3) -> Vec3 {
    let normal = flat_normal(normal);
    let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
    horizontal - normal * horizontal.dot(normal)
}

/// Whether an airborne body may attach to `wall`.
pub(super) fn can_attach(
    body: &KinematicBody,
    timers: &Timers,
    config: &MovementConfig,
    wall: &WallHit,
) -> bool {
    timers.wall_run_cooldown <= 0.0
        && along_wall(body.velocity, wall.normal).length() >= config.wall_run_min_speed
}

/// Start running on `wall`.
pub(super) fn attach(body: &mut KinematicBody, timers: &mut Timers, config: &MovementConfig, wall: &WallHit) {
    body.wall_normal = flat_normal(wall.normal);
    body.velocity.y = config.wall_run_boost;
    timers.wall_run_elapsed = 0.0;
}

/// Advance the wall-run by `dt`.
///
/// Returns `false` once the run has lasted `wall_run_max_time`; the elapsed
/// time is clamped so it never exceeds that bound.
pub(super) fn advance(
    body: &mut KinematicBody,
    timers: &mut Timers,
    config: &MovementConfig,
    dt: f32,
) -> bool {
    timers.wall_run_elapsed = (timers.wall_run_elapsed + dt).min(config.wall_run_max_time);
    if timers.wall_run_elapsed >= config.wall_run_max_time {
        return false;
    }

    let mut tangent = along_wall(body.velocity, body.wall_normal);
    let speed = tangent.length();
    if speed < config.wall_run_speed {
        let direction = if speed > 1e-4 {
            tangent / speed
        } else {
            along_wall(body.forward(), body.wall_normal).normalize_or_zero()
        };
        tangent = direction * config.wall_run_speed;
    }

    body.velocity.x = tangent.x;
    body.velocity.z = tangent.z;
    body.velocity.y *= (-config.wall_run_vertical_damping * dt).exp();
    true
}

/// Leave the wall and block re-attaching for `wall_run_cooldown`.
pub(super) fn detach(timers: &mut Timers, config: &MovementConfig) {
    timers.wall_run_cooldown = config.wall_run_cooldown;
}
