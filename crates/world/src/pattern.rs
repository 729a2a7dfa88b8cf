//! Layout patterns.

use serde::{Deserialize, Serialize};

use crate::random::SeededRng;

/// The layout style of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// Start platform and easy warm-up run. Only used for the first chunk.
    Start,
    /// Long platforms with small height changes.
    StraightRun,
    /// Small square stones with alternating sideways offsets.
    SteppingStones,
    /// Inclined platforms climbing toward the chunk's exit height.
    RampUp,
    /// Inclined platforms descending toward the chunk's exit height.
    RampDown,
    /// Bounce pads launching onto higher platforms.
    BounceJump,
    /// Gaps lined by walls to run along.
    WallRun,
    /// Medium platforms with wide alternating sideways offsets.
    Zigzag,
}

impl Pattern {
    /// Patterns the generator picks from after the start chunk.
    pub const GENERATED: [Pattern; 7] = [
        Pattern::StraightRun,
        Pattern::SteppingStones,
        Pattern::RampUp,
        Pattern::RampDown,
        Pattern::BounceJump,
        Pattern::WallRun,
        Pattern::Zigzag,
    ];

    /// Pick a pattern different from `previous`.
    pub fn choose(rng: &mut SeededRng, previous: Option<Pattern>) -> Pattern {
        rng.pick_except(&Self::GENERATED, previous)
            .unwrap_or(Pattern::StraightRun)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Start => "start",
            Pattern::StraightRun => "straight_run",
            Pattern::SteppingStones => "stepping_stones",
            Pattern::RampUp => "ramp_up",
            Pattern::RampDown => "ramp_down",
            Pattern::BounceJump => "bounce_jump",
            Pattern::WallRun => "wall_run",
            Pattern::Zigzag => "zigzag",
        }
    }

    /// Sideways shift between consecutive platforms, as a multiple of the
    /// alternating sign. Zero keeps the platforms on the centerline.
    pub(crate) fn lateral_step(&self) -> f32 {
        match self {
            Pattern::SteppingStones => 1.5,
            Pattern::Zigzag => 2.5,
            _ => 0.0,
        }
    }

    /// Whether the platform before a feature slot must be a full runway.
    pub(crate) fn needs_runway(&self) -> bool {
        matches!(
            self,
            Pattern::RampUp | Pattern::RampDown | Pattern::BounceJump | Pattern::WallRun
        )
    }
}
