//! Checkpoints, death and respawn points.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::chunk::ChunkIndex;
use crate::config::CheckpointConfig;
use crate::events::WorldEvent;
use crate::platform::{CheckpointId, Platform};
use crate::streaming::ChunkManager;

/// Sinking this far into a checkpoint surface still counts as standing on it.
const SURFACE_TOLERANCE: f32 = 0.5;

/// The checkpoint the traveler respawns at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveCheckpoint {
    pub id: CheckpointId,
    /// Chunk that owns the checkpoint platform.
    pub chunk: ChunkIndex,
    /// Center of the checkpoint's top surface.
    pub position: Vec3,
    /// Where the traveler reappears.
    pub respawn: Vec3,
}

/// Tracks the single active checkpoint and detects deaths.
#[derive(Debug, Clone)]
pub struct CheckpointSystem {
    config: CheckpointConfig,
    active: Option<ActiveCheckpoint>,
    cooldown: f32,
}

impl CheckpointSystem {
    pub fn new(config: CheckpointConfig) -> Self {
        Self {
            config,
            active: None,
            cooldown: 0.0,
        }
    }

    pub fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    pub fn active(&self) -> Option<&ActiveCheckpoint> {
        self.active.as_ref()
    }

    /// Chunk that must not be disposed while its checkpoint is active.
    pub fn pinned_chunk(&self) -> Option<ChunkIndex> {
        self.active.map(|active| active.chunk)
    }

    /// Remaining respawn cooldown (seconds).
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Where a dead traveler reappears: the active checkpoint's respawn point,
    /// or the default spawn before any checkpoint was reached.
    pub fn respawn_point(&self) -> Vec3 {
        self.active
            .map_or(self.config.default_spawn, |active| active.respawn)
    }

    /// Make `id` the active checkpoint, replacing any previous one.
    ///
    /// `position` is the center of the checkpoint's top surface. Returns
    /// `false` when `id` is already active.
    pub fn activate(&mut self, id: CheckpointId, chunk: ChunkIndex, position: Vec3) -> bool {
        if self.active.is_some_and(|active| active.id == id) {
            return false;
        }

        let previous = self.active.map(|active| active.id);
        self.active = Some(ActiveCheckpoint {
            id,
            chunk,
            position,
            respawn: position + Vec3::Y * self.config.respawn_offset,
        });
        log::info!("checkpoint {id} activated (previous: {previous:?}) at {position}");
        true
    }

    /// Whether `position` is inside the activation box of `platform`.
    ///
    /// The box covers the platform's top grown by the longitudinal margin and
    /// lateral tolerance, from just below the surface up to `vertical_band`.
    pub fn in_range(&self, platform: &Platform, position: Vec3) -> bool {
        let footprint = &platform.footprint;
        let local = footprint.to_local(position);
        local.z.abs() <= footprint.length * 0.5 + self.config.longitudinal_margin
            && local.x.abs() <= footprint.width * 0.5 + self.config.lateral_tolerance
            && (-SURFACE_TOLERANCE..=self.config.vertical_band).contains(&local.y)
    }

    /// Test `position` against every live checkpoint and activate the first
    /// one in range. The manager's activation flags are kept in sync.
    ///
    /// Returns `true` when a new checkpoint was activated.
    pub fn update(
        &mut self,
        manager: &mut ChunkManager,
        position: Vec3,
        events: &mut Vec<WorldEvent>,
    ) -> bool {
        let reached = manager
            .checkpoints()
            .find(|(_, platform)| self.in_range(platform, position))
            .and_then(|(chunk, platform)| {
                platform
                    .checkpoint_id()
                    .map(|id| (id, chunk, platform.footprint.center))
            });

        let Some((id, chunk, top)) = reached else {
            return false;
        };
        if !self.activate(id, chunk, top) {
            return false;
        }

        manager.mark_active(Some(id));
        events.push(WorldEvent::CheckpointReached { id, position: top });
        true
    }

    /// Count down the respawn cooldown.
    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// Detect a fall below the death height.
    ///
    /// Returns the respawn point when the traveler died. A death starts the
    /// respawn cooldown; while it runs further falls are ignored.
    pub fn check_death(&mut self, position: Vec3) -> Option<Vec3> {
        if position.y >= self.config.death_height || self.cooldown > 0.0 {
            return None;
        }

        self.cooldown = self.config.respawn_cooldown;
        let respawn = self.respawn_point();
        log::warn!(
            "fell below {:.1} at {position}, respawning at {respawn}",
            self.config.death_height
        );
        Some(respawn)
    }

    /// Drop the active checkpoint when `chunk`, the one it pins, was
    /// disposed. The cooldown keeps running.
    ///
    /// Returns `true` when the active checkpoint was dropped.
    pub fn release_chunk(&mut self, chunk: ChunkIndex) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        if active.chunk != chunk {
            return false;
        }

        log::warn!("checkpoint {} lost with chunk {chunk}", active.id);
        self.active = None;
        true
    }

    /// Forget the active checkpoint and any pending cooldown.
    pub fn reset(&mut self) {
        self.active = None;
        self.cooldown = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorConfig, StreamingConfig};
    use crate::generator::ChunkGenerator;
    use crate::platform::{Footprint, PlatformKind};
    use parkour_physics::MovementConfig;

    fn create_test_checkpoint() -> Platform {
        Platform::new(
            1,
            PlatformKind::Checkpoint { id: 4, active: false },
            Footprint {
                center: Vec3::new(0.0, 2.0, 30.0),
                width: 8.0,
                length: 6.0,
                yaw: 0.0,
            },
            1.0,
        )
    }

    fn create_test_manager() -> ChunkManager {
        let movement = MovementConfig::default();
        let generator = ChunkGenerator::new(GeneratorConfig::for_movement(&movement), &movement);
        let mut manager = ChunkManager::new(
            generator,
            StreamingConfig {
                lookahead_chunks: 8,
                ..Default::default()
            },
        );
        manager.reset(Vec3::ZERO, &mut Vec::new());
        manager
    }

    #[test]
    fn test_in_range_tolerances() {
        let system = CheckpointSystem::new(CheckpointConfig::default());
        let platform = create_test_checkpoint();

        assert!(system.in_range(&platform, Vec3::new(0.0, 2.0, 30.0)));
        // Lateral drift past the edge is tolerated
        assert!(system.in_range(&platform, Vec3::new(5.0, 2.5, 30.0)));
        // Longitudinal margin
        assert!(system.in_range(&platform, Vec3::new(0.0, 2.0, 33.8)));
        assert!(!system.in_range(&platform, Vec3::new(0.0, 2.0, 34.5)));
        // Far above or below the surface
        assert!(!system.in_range(&platform, Vec3::new(0.0, 6.0, 30.0)));
        assert!(!system.in_range(&platform, Vec3::new(0.0, 0.0, 30.0)));
    }

    #[test]
    fn test_activate_is_idempotent_and_exclusive() {
        let mut system = CheckpointSystem::new(CheckpointConfig::default());

        assert!(system.activate(1, 3, Vec3::new(0.0, 1.0, 10.0)));
        assert!(!system.activate(1, 3, Vec3::new(0.0, 1.0, 10.0)));
        assert!(system.activate(2, 6, Vec3::new(0.0, 2.0, 40.0)));

        let active = system.active().unwrap();
        assert_eq!(active.id, 2);
        assert_eq!(system.pinned_chunk(), Some(6));
        assert!((active.respawn - Vec3::new(0.0, 2.5, 40.0)).length() < 1e-5);
    }

    #[test]
    fn test_release_chunk_drops_only_its_checkpoint() {
        let mut system = CheckpointSystem::new(CheckpointConfig::default());
        system.activate(2, 6, Vec3::new(0.0, 2.0, 40.0));
        system.check_death(Vec3::new(0.0, -50.0, 0.0));

        assert!(!system.release_chunk(5));
        assert_eq!(system.pinned_chunk(), Some(6));

        assert!(system.release_chunk(6));
        assert!(system.active().is_none());
        assert_eq!(system.respawn_point(), system.config().default_spawn);
        assert!(system.cooldown() > 0.0);
    }

    #[test]
    fn test_respawn_point_defaults_to_spawn() {
        let config = CheckpointConfig {
            default_spawn: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let system = CheckpointSystem::new(config);
        assert_eq!(system.respawn_point(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_death_respects_cooldown() {
        let mut system = CheckpointSystem::new(CheckpointConfig::default());
        let below = Vec3::new(0.0, -20.0, 0.0);

        assert!(system.check_death(Vec3::ZERO).is_none());
        assert_eq!(system.check_death(below), Some(Vec3::ZERO));
        assert!(system.check_death(below).is_none());

        system.tick(0.5);
        assert!(system.check_death(below).is_none());
        system.tick(0.6);
        assert!(system.check_death(below).is_some());
    }

    #[test]
    fn test_update_activates_streamed_checkpoint() {
        let mut manager = create_test_manager();
        let mut system = CheckpointSystem::new(CheckpointConfig::default());
        let mut events = Vec::new();

        let (chunk, top) = manager
            .checkpoints()
            .map(|(chunk, platform)| (chunk, platform.footprint.center))
            .next()
            .expect("a checkpoint in the window");

        assert!(system.update(&mut manager, top + Vec3::Y * 0.1, &mut events));
        assert!(!system.update(&mut manager, top + Vec3::Y * 0.1, &mut events));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], WorldEvent::CheckpointReached { .. }));
        assert_eq!(system.pinned_chunk(), Some(chunk));

        let active: Vec<_> = manager
            .checkpoints()
            .filter(|(_, p)| p.is_active_checkpoint())
            .collect();
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn test_second_checkpoint_deactivates_first() {
        let mut manager = create_test_manager();
        let mut system = CheckpointSystem::new(CheckpointConfig::default());
        let mut events = Vec::new();

        let tops: Vec<Vec3> = manager
            .checkpoints()
            .map(|(_, platform)| platform.footprint.center)
            .collect();
        assert!(tops.len() >= 2);

        system.update(&mut manager, tops[0], &mut events);
        system.update(&mut manager, tops[1], &mut events);

        let active: Vec<CheckpointId> = manager
            .checkpoints()
            .filter(|(_, p)| p.is_active_checkpoint())
            .filter_map(|(_, p)| p.checkpoint_id())
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(Some(active[0]), system.active().map(|a| a.id));
        assert_eq!(events.len(), 2);
    }
}
