//! Jump resolution.
//!
//! A jump press is buffered for `jump_buffer` seconds. While the buffer is
//! live and the cooldown has elapsed, the press turns into a jump as soon as
//! the body is somewhere it can jump from: on the ground, within coyote time
//! after walking off an edge, or on a wall.

use glam::Vec3;

use super::config::MovementConfig;
use super::state::{MovementMode, Timers};

/// What kind of jump a buffered press resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum JumpKind {
    /// From the ground, a crouch or a slide.
    Ground,
    /// From the air shortly after walking off an edge.
    Coyote,
    /// Off the wall being run on.
    Wall,
}

/// The jump to execute this tick, if any.
pub(super) fn pending_jump(mode: MovementMode, timers: &Timers) -> Option<JumpKind> {
    if timers.jump_buffer <= 0.0 || timers.jump_cooldown > 0.0 {
        return None;
    }

    match mode {
        MovementMode::Grounded | MovementMode::Crouching | MovementMode::Sliding => {
            Some(JumpKind::Ground)
        }
        MovementMode::Airborne if timers.coyote > 0.0 => Some(JumpKind::Coyote),
        MovementMode::Airborne => None,
        MovementMode::WallRunning => Some(JumpKind::Wall),
    }
}

/// Consume the buffered press and start the cooldown.
pub(super) fn consume(timers: &mut Timers, config: &MovementConfig) {
    timers.jump_cooldown = config.jump_cooldown;
    timers.coyote = 0.0;
    timers.jump_buffer = 0.0;
}

/// Velocity after jumping off a wall.
///
/// Keeps the motion along the wall, pushes away from it and launches upward
/// slightly less than a ground jump.
pub(super) fn wall_jump_velocity(velocity: Vec3, wall_normal: Vec3, config: &MovementConfig) -> Vec3 {
    let normal = Vec3::new(wall_normal.x, 0.0, wall_normal.z).normalize_or_zero();
    let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
    let along_wall = horizontal - normal * horizontal.dot(normal);

    let mut result = along_wall + normal * config.wall_jump_push;
    result.y = 0.9 * config.jump_force;
    result
}

// ============================================================================
// Tests
// ============================================================================
