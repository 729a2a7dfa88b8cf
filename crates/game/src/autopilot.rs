//! Scripted driver that runs the generated path.
//!
//! Used by the headless runner and long-run tests. It steers toward the next
//! walkable platform, holds sprint and jumps when the ground ahead runs out.
//! It is deliberately naive; it exists to exercise streaming and checkpoints,
//! not to play well.

use glam::Vec3;
use parkour_physics::{CollisionProbe, MovementMode};
use parkour_world::Platform;

use crate::input::PlayerInput;
use crate::simulation::Simulation;

/// Steering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Autopilot {
    /// Distance before a platform's far edge at which the next one becomes
    /// the target.
    pub edge_margin: f32,
    /// How far ahead of the body the ground is checked.
    pub look_ahead: f32,
    /// How far down the look-ahead probe reaches.
    pub drop_tolerance: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            edge_margin: 0.5,
            look_ahead: 0.6,
            drop_tolerance: 1.5,
        }
    }
}

impl Autopilot {
    /// Input for the next tick.
    pub fn steer(&self, sim: &Simulation) -> PlayerInput {
        let body = sim.body();
        let mut input = PlayerInput::forward(body.yaw);
        input.actions.sprint = true;

        if let Some(aim) = self.aim_point(sim) {
            let to = aim - body.position;
            if to.x.abs() + to.z.abs() > 1e-3 {
                input.yaw = to.x.atan2(to.z);
            }
        }

        if body.mode == MovementMode::Grounded && !self.ground_ahead(sim, input.yaw) {
            input.actions.jump = true;
        }
        input
    }

    /// Where to head: the far edge of the platform being crossed, or the
    /// center of the next one once that edge is close.
    fn aim_point(&self, sim: &Simulation) -> Option<Vec3> {
        let progress = sim.chunks().progress(sim.body().position);
        let target = self.target(sim, progress)?;

        if progress >= target.span.start {
            Some(target.exit_point())
        } else {
            Some(target.footprint.center)
        }
    }

    fn target<'a>(&self, sim: &'a Simulation, progress: f32) -> Option<&'a Platform> {
        sim.chunks()
            .chunks()
            .flat_map(|chunk| chunk.walkable())
            .find(|platform| platform.span.end > progress + self.edge_margin)
    }

    fn ground_ahead(&self, sim: &Simulation, yaw: f32) -> bool {
        let body = sim.body();
        let radius = sim.controller().config().radius;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let origin = body.position + forward * (radius + self.look_ahead) + Vec3::Y * 0.5;

        CollisionProbe::new(sim.chunks().world())
            .ground(origin, 0.0, 0, 0.5 + self.drop_tolerance)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    #[test]
    fn test_holds_sprint_and_forward() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        let input = Autopilot::default().steer(&sim);

        assert!(input.actions.sprint);
        assert!(input.keys.forward);
        // Standing in the middle of the start platform: no reason to jump
        assert!(!input.actions.jump);
    }

    #[test]
    fn test_jumps_at_edge() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let start = sim.chunks().chunks().next().unwrap();
        let edge = start.platforms[0].exit_point() - Vec3::Z * 0.2;
        sim.teleport(edge);

        let input = Autopilot::default().steer(&sim);
        assert!(input.actions.jump);
    }
}
