//! Movement state and input structures.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// The controller's current movement state. Exactly one is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    /// Standing or running on a walkable surface.
    #[default]
    Grounded,
    /// Jumping, falling or bouncing.
    Airborne,
    /// Crouched on the ground.
    Crouching,
    /// Momentum-only slide along the ground.
    Sliding,
    /// Running along a vertical wall without gravity.
    WallRunning,
}

impl MovementMode {
    /// Whether the state machine has an edge from `self` to `next`.
    pub fn can_transition_to(self, next: MovementMode) -> bool {
        use MovementMode::*;

        matches!(
            (self, next),
            (Grounded, Airborne | Crouching | Sliding)
                | (Airborne, Grounded | WallRunning)
                | (Crouching, Grounded | Sliding | Airborne)
                | (Sliding, Crouching | Airborne)
                | (WallRunning, Airborne)
        )
    }

    /// Modes in which the body rests on a surface.
    #[inline]
    pub fn is_grounded(self) -> bool {
        matches!(
            self,
            MovementMode::Grounded | MovementMode::Crouching | MovementMode::Sliding
        )
    }

    /// Modes that allow sprinting.
    #[inline]
    pub fn allows_sprint(self) -> bool {
        matches!(
            self,
            MovementMode::Grounded | MovementMode::Airborne | MovementMode::WallRunning
        )
    }
}

/// Countdown and duration timers (seconds). None is ever negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timers {
    /// Time until another jump is allowed.
    pub jump_cooldown: f32,
    /// Remaining coyote time after walking off an edge.
    pub coyote: f32,
    /// Remaining lifetime of a buffered jump press.
    pub jump_buffer: f32,
    /// Time spent in the current wall-run.
    pub wall_run_elapsed: f32,
    /// Time until a wall may be attached to again.
    pub wall_run_cooldown: f32,
    /// Time spent in the current slide.
    pub slide_elapsed: f32,
    /// Time until another slide may start.
    pub slide_cooldown: f32,
    /// How long sprint has been held continuously while moving.
    pub sprint_duration: f32,
}

impl Timers {
    /// Count every countdown down by `dt`, stopping at zero.
    pub fn tick(&mut self, dt: f32) {
        for timer in [
            &mut self.jump_cooldown,
            &mut self.coyote,
            &mut self.jump_buffer,
            &mut self.wall_run_cooldown,
            &mut self.slide_cooldown,
        ] {
            *timer = (*timer - dt).max(0.0);
        }
    }
}

/// Complete kinematic state of the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    /// Position in world space (feet, bottom center of the body).
    pub position: Vec3,

    /// Velocity in world space (meters/second).
    pub velocity: Vec3,

    /// Facing yaw in radians. Zero faces +Z.
    pub yaw: f32,

    /// Current collision height (changes with crouch and slide).
    pub height: f32,

    /// Current eye height above the feet, smoothed toward the mode target.
    pub eye_height: f32,

    /// Current movement mode.
    pub mode: MovementMode,

    /// Normal of the ground under the body (valid in grounded modes).
    pub ground_normal: Vec3,

    /// Normal of the wall being run on (valid while wall-running).
    pub wall_normal: Vec3,

    /// Horizontal direction of the current slide.
    pub slide_direction: Vec3,

    /// Horizontal speed of the current slide.
    pub slide_speed: f32,

    /// Whether the body is sprinting.
    pub sprinting: bool,
}

impl KinematicBody {
    /// Create a standing body at `position`.
    pub fn new(position: Vec3, height: f32, eye_height: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            height,
            eye_height,
            mode: MovementMode::Grounded,
            ground_normal: Vec3::Y,
            wall_normal: Vec3::ZERO,
            slide_direction: Vec3::Z,
            slide_speed: 0.0,
            sprinting: false,
        }
    }

    /// Camera position.
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.eye_height
    }

    /// Horizontal facing direction.
    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::Z
    }

    /// Horizontal direction to the body's right.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y)
    }

    /// Current horizontal speed.
    pub fn horizontal_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }

    /// Center of the body.
    pub fn center(&self) -> Vec3 {
        self.position + Vec3::Y * (self.height * 0.5)
    }
}

/// Held and just-pressed state of the discrete actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSet {
    /// Actions currently held down.
    pub held: u8,
    /// Actions that went down this frame.
    pub pressed: u8,
}

impl ActionSet {
    /// Jump action.
    pub const JUMP: u8 = 1 << 0;

    /// Sprint action.
    pub const SPRINT: u8 = 1 << 1;

    /// Crouch / slide action.
    pub const CROUCH: u8 = 1 << 2;

    /// Check if an action is held.
    #[inline]
    pub fn is_held(self, action: u8) -> bool {
        (self.held & action) != 0
    }

    /// Check if an action went down this frame.
    #[inline]
    pub fn just_pressed(self, action: u8) -> bool {
        (self.pressed & action) != 0
    }

    /// Press an action this frame (held and just pressed).
    #[inline]
    pub fn press(&mut self, action: u8) {
        self.held |= action;
        self.pressed |= action;
    }

    /// Keep an action held without a new press.
    #[inline]
    pub fn hold(&mut self, action: u8) {
        self.held |= action;
    }

    /// Release an action.
    #[inline]
    pub fn release(&mut self, action: u8) {
        self.held &= !action;
        self.pressed &= !action;
    }
}

/// Input for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementInput {
    /// Movement vector in body space: `x` strafes right, `y` moves forward.
    /// Components in [-1, 1], diagonals already normalized.
    pub movement: Vec2,

    /// Facing yaw in radians.
    pub yaw: f32,

    /// Action states.
    pub actions: ActionSet,
}

impl MovementInput {
    /// Input that moves forward at full stick facing `yaw`.
    pub fn forward(yaw: f32) -> Self {
        Self {
            movement: Vec2::Y,
            yaw,
            actions: ActionSet::default(),
        }
    }

    /// Same input with an action pressed this frame.
    pub fn pressing(mut self, action: u8) -> Self {
        self.actions.press(action);
        self
    }

    /// Same input with an action held.
    pub fn holding(mut self, action: u8) -> Self {
        self.actions.hold(action);
        self
    }

    /// Check if any movement input is active.
    #[inline]
    pub fn has_movement(&self) -> bool {
        self.movement.length_squared() > 1e-4
    }

    /// World-space wish direction (horizontal, length at most 1).
    pub fn wish_direction(&self) -> Vec3 {
        if !self.has_movement() {
            return Vec3::ZERO;
        }

        let forward = Quat::from_rotation_y(self.yaw) * Vec3::Z;
        let right = forward.cross(Vec3::Y);
        let wish = right * self.movement.x + forward * self.movement.y;
        if wish.length_squared() > 1.0 {
            wish.normalize()
        } else {
            wish
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transition_table() {
        use MovementMode::*;

        assert!(Grounded.can_transition_to(Sliding));
        assert!(Crouching.can_transition_to(Airborne));
        assert!(Airborne.can_transition_to(WallRunning));
        // Slides always end crouched
        assert!(!Sliding.can_transition_to(Grounded));
        assert!(!WallRunning.can_transition_to(Grounded));
        assert!(!Airborne.can_transition_to(Sliding));
        assert!(!Grounded.can_transition_to(Grounded));
    }

    #[test]
    fn test_timers_never_negative() {
        let mut timers = Timers {
            jump_cooldown: 0.05,
            coyote: 0.1,
            jump_buffer: 0.2,
            ..Default::default()
        };
        timers.tick(0.1);
        assert_eq!(timers.jump_cooldown, 0.0);
        assert_eq!(timers.coyote, 0.0);
        assert!((timers.jump_buffer - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_body_directions() {
        let mut body = KinematicBody::new(Vec3::ZERO, 1.8, 1.6);

        // Facing +Z (yaw = 0)
        let forward = body.forward();
        assert!((forward.z - 1.0).abs() < 0.01);

        // Facing +X (yaw = PI/2)
        body.yaw = FRAC_PI_2;
        let forward = body.forward();
        assert!((forward.x - 1.0).abs() < 0.01);
        assert!(forward.z.abs() < 0.01);
        assert!(body.right().dot(forward).abs() < 1e-5);
    }

    #[test]
    fn test_action_set() {
        let mut actions = ActionSet::default();
        assert!(!actions.is_held(ActionSet::JUMP));

        actions.press(ActionSet::JUMP);
        assert!(actions.just_pressed(ActionSet::JUMP));
        assert!(actions.is_held(ActionSet::JUMP));

        actions.hold(ActionSet::SPRINT);
        assert!(actions.is_held(ActionSet::SPRINT));
        assert!(!actions.just_pressed(ActionSet::SPRINT));

        actions.release(ActionSet::JUMP);
        assert!(!actions.is_held(ActionSet::JUMP));
    }

    #[test]
    fn test_wish_direction_clamped() {
        let input = MovementInput {
            movement: Vec2::new(1.0, 1.0),
            ..Default::default()
        };
        assert!((input.wish_direction().length() - 1.0).abs() < 1e-5);
        assert_eq!(MovementInput::default().wish_direction(), Vec3::ZERO);

        let forward = MovementInput::forward(0.0).wish_direction();
        assert!((forward - Vec3::Z).length() < 1e-5);
    }
}
