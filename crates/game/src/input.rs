//! Player input handling.
//!
//! This module converts raw per-frame input (keys, stick, view yaw) into the
//! [`MovementInput`] the controller consumes. Just-pressed edges are derived
//! here by comparing against the previous frame.

use glam::Vec2;
use parkour_physics::{ActionSet, MovementInput};
use serde::{Deserialize, Serialize};

/// Raw player input for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub keys: MoveKeys,

    /// Analog stick (`x` right, `y` forward). Overrides the keys when non-zero.
    pub stick: Vec2,

    /// Facing yaw in radians.
    pub yaw: f32,

    /// Action buttons held.
    pub actions: ActionInput,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInput {
    pub jump: bool,
    pub sprint: bool,
    pub crouch: bool,
}

impl ActionInput {
    fn bits(self) -> u8 {
        let mut bits = 0;
        if self.jump {
            bits |= ActionSet::JUMP;
        }
        if self.sprint {
            bits |= ActionSet::SPRINT;
        }
        if self.crouch {
            bits |= ActionSet::CROUCH;
        }
        bits
    }
}

impl PlayerInput {
    /// Holding forward while facing `yaw`.
    pub fn forward(yaw: f32) -> Self {
        Self {
            keys: MoveKeys {
                forward: true,
                ..Default::default()
            },
            yaw,
            ..Default::default()
        }
    }

    /// Movement vector with components in [-1, 1], diagonals normalized.
    pub fn axes(&self) -> Vec2 {
        if self.stick.length_squared() > 1e-6 {
            let stick = self.stick.clamp(Vec2::NEG_ONE, Vec2::ONE);
            return if stick.length_squared() > 1.0 {
                stick.normalize()
            } else {
                stick
            };
        }

        let mut axes = Vec2::ZERO;
        if self.keys.forward {
            axes.y += 1.0;
        }
        if self.keys.backward {
            axes.y -= 1.0;
        }
        if self.keys.right {
            axes.x += 1.0;
        }
        if self.keys.left {
            axes.x -= 1.0;
        }

        // Normalize diagonal movement
        if axes.length_squared() > 1.0 {
            axes.normalize()
        } else {
            axes
        }
    }

    /// Check if any movement input is active.
    pub fn has_movement(&self) -> bool {
        self.axes().length_squared() > 1e-6
    }
}

/// Remembers last frame's buttons to produce just-pressed edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputTracker {
    previous: u8,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert this frame's input, marking buttons that were up last frame
    /// as just pressed.
    pub fn track(&mut self, input: &PlayerInput) -> MovementInput {
        let held = input.actions.bits();
        let pressed = held & !self.previous;
        self.previous = held;

        MovementInput {
            movement: input.axes(),
            yaw: input.yaw,
            actions: ActionSet { held, pressed },
        }
    }

    /// Forget held buttons, so the next held button counts as a new press.
    pub fn reset(&mut self) {
        self.previous = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_keys_normalized() {
        let mut input = PlayerInput::forward(0.0);
        input.keys.right = true;

        let axes = input.axes();
        assert!(axes.x > 0.0 && axes.x < 1.0);
        assert!((axes.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_straight_movement_not_normalized() {
        let input = PlayerInput::forward(0.0);
        assert_eq!(input.axes(), Vec2::Y);
        assert!(!PlayerInput::default().has_movement());
    }

    #[test]
    fn test_stick_overrides_keys() {
        let mut input = PlayerInput::forward(0.0);
        input.stick = Vec2::new(0.5, 0.0);
        assert_eq!(input.axes(), Vec2::new(0.5, 0.0));

        input.stick = Vec2::new(3.0, 3.0);
        assert!((input.axes().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_just_pressed_edges() {
        let mut tracker = InputTracker::new();
        let mut input = PlayerInput::default();
        input.actions.jump = true;

        let first = tracker.track(&input);
        assert!(first.actions.just_pressed(ActionSet::JUMP));
        assert!(first.actions.is_held(ActionSet::JUMP));

        // Still held: no new press
        let second = tracker.track(&input);
        assert!(!second.actions.just_pressed(ActionSet::JUMP));
        assert!(second.actions.is_held(ActionSet::JUMP));

        input.actions.jump = false;
        tracker.track(&input);
        input.actions.jump = true;
        assert!(tracker.track(&input).actions.just_pressed(ActionSet::JUMP));
    }
}
