//! The simulation context.
//!
//! Owns the movement controller, the streaming window and the checkpoint
//! system, and advances them together in a fixed order every tick:
//!
//! ```text
//! input ──► movement ──► streaming ──► checkpoints ──► death/respawn ──► dispatch
//! ```
//!
//! Nothing here is global. Every collaborator receives what it needs as an
//! argument, and events flow out through the [`EventBus`].

use glam::Vec3;
use parkour_physics::{
    ConfigError, KinematicBody, MovementController, MovementEvent, MovementMode,
};
use parkour_world::{ChunkGenerator, ChunkManager, CheckpointSystem, WorldEvent, START_CHUNK};
use serde::{Deserialize, Serialize};

use crate::config::{ResetMode, SimulationConfig};
use crate::events::{EventBus, GameEvent, SubscriptionId};
use crate::input::{InputTracker, PlayerInput};

/// Read-only counters for the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Ticks simulated.
    pub ticks: u64,
    /// Simulated seconds (after delta clamping).
    pub time: f32,
    /// Horizontal distance moved, excluding teleports.
    pub distance: f32,
    /// Furthest point reached along the path.
    pub best_distance: f32,
    pub chunks_generated: u32,
    pub chunks_disposed: u32,
    pub deaths: u32,
    pub checkpoints: u32,
    pub jumps: u32,
}

impl RunStats {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Movement(MovementEvent::Jump | MovementEvent::WallJump) => self.jumps += 1,
            GameEvent::World(WorldEvent::ChunkGenerated { .. }) => self.chunks_generated += 1,
            GameEvent::World(WorldEvent::ChunkDisposed { .. }) => self.chunks_disposed += 1,
            GameEvent::World(WorldEvent::CheckpointReached { .. }) => self.checkpoints += 1,
            GameEvent::Death { .. } => self.deaths += 1,
            _ => {}
        }
    }
}

/// The whole parkour core: one traveler in one endless world.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame number.
    pub frame: u64,

    config: SimulationConfig,
    controller: MovementController,
    chunks: ChunkManager,
    checkpoints: CheckpointSystem,
    input: InputTracker,
    bus: EventBus,
    stats: RunStats,

    /// Events dispatched by the last tick.
    frame_events: Vec<GameEvent>,

    // Per-tick buffers handed to the systems.
    movement_events: Vec<MovementEvent>,
    world_events: Vec<WorldEvent>,
}

impl Simulation {
    /// Validate `config` and build the start area around the default spawn.
    ///
    /// The events of the initial generation are queued and delivered on the
    /// first tick.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let spawn = config.checkpoint.default_spawn;
        let generator = ChunkGenerator::new(config.generator.clone(), &config.movement);
        let mut sim = Self {
            frame: 0,
            controller: MovementController::new(config.movement.clone(), spawn),
            chunks: ChunkManager::new(generator, config.streaming.clone()),
            checkpoints: CheckpointSystem::new(config.checkpoint.clone()),
            input: InputTracker::new(),
            bus: EventBus::new(),
            stats: RunStats::default(),
            frame_events: Vec::new(),
            movement_events: Vec::new(),
            world_events: Vec::new(),
            config,
        };

        sim.chunks.reset(spawn, &mut sim.world_events);
        sim.forward_world_events();
        sim.stats.best_distance = sim.chunks.progress(spawn);

        log::info!(
            "simulation ready: seed {}, {} chunks, {} obstacles",
            sim.config.generator.seed,
            sim.chunks.chunk_count(),
            sim.chunks.world().len()
        );
        Ok(sim)
    }

    /// Advance the simulation by one tick.
    ///
    /// # Returns
    ///
    /// The clamped time step actually simulated (zero for non-positive
    /// `delta_time`, in which case nothing advances).
    pub fn tick(&mut self, input: &PlayerInput, delta_time: f32) -> f32 {
        // Button edges survive a skipped tick
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return 0.0;
        }
        let movement_input = self.input.track(input);
        let before = self.controller.body().position;

        let dt = self.controller.update(
            self.chunks.world(),
            &movement_input,
            delta_time,
            &mut self.movement_events,
        );
        self.forward_movement_events();

        let position = self.controller.body().position;
        self.chunks
            .update(position, self.checkpoints.pinned_chunk(), dt, &mut self.world_events);
        for event in &self.world_events {
            if let WorldEvent::ChunkDisposed { index } = *event {
                self.checkpoints.release_chunk(index);
            }
        }

        self.checkpoints.tick(dt);
        self.checkpoints
            .update(&mut self.chunks, position, &mut self.world_events);
        self.forward_world_events();

        let died = self.check_death(position);

        let after = self.controller.body().position;
        if !died {
            self.stats.distance += (after - before).with_y(0.0).length();
        }
        self.stats.best_distance = self.stats.best_distance.max(self.chunks.progress(after));
        self.stats.ticks += 1;
        self.stats.time += dt;

        self.frame_events = self.bus.dispatch();
        self.frame += 1;
        dt
    }

    /// Dispose the whole world, regenerate it from the seed and respawn at
    /// the default spawn with no active checkpoint.
    pub fn hard_reset(&mut self) {
        let spawn = self.config.checkpoint.default_spawn;
        log::info!("hard reset, respawning at {spawn}");

        self.checkpoints.reset();
        self.chunks.reset(spawn, &mut self.world_events);
        self.forward_world_events();
        self.respawn(spawn);
    }

    /// Move the traveler to `position` at rest without touching the world.
    pub fn teleport(&mut self, position: Vec3) {
        self.controller.respawn(position, &mut self.movement_events);
        self.forward_movement_events();
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Register a handler for every event, delivered at the end of each tick.
    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Events delivered by the last tick, in emission order.
    pub fn events(&self) -> &[GameEvent] {
        &self.frame_events
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn controller(&self) -> &MovementController {
        &self.controller
    }

    pub fn body(&self) -> &KinematicBody {
        self.controller.body()
    }

    pub fn mode(&self) -> MovementMode {
        self.controller.mode()
    }

    pub fn chunks(&self) -> &ChunkManager {
        &self.chunks
    }

    pub fn checkpoints(&self) -> &CheckpointSystem {
        &self.checkpoints
    }

    /// Mutable checkpoint access, for scripted activation.
    pub fn checkpoints_mut(&mut self) -> &mut CheckpointSystem {
        &mut self.checkpoints
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn check_death(&mut self, position: Vec3) -> bool {
        let Some(respawn) = self.checkpoints.check_death(position) else {
            return false;
        };
        self.emit(GameEvent::Death { position });

        match self.config.reset_mode {
            ResetMode::Soft if self.respawn_is_live() => self.respawn(respawn),
            ResetMode::Soft => {
                log::warn!("respawn point {respawn} was streamed out, regenerating the world");
                self.hard_reset();
            }
            ResetMode::Hard => self.hard_reset(),
        }
        true
    }

    /// Whether the chunk holding the respawn point is still live.
    fn respawn_is_live(&self) -> bool {
        let chunk = self.checkpoints.pinned_chunk().unwrap_or(START_CHUNK);
        self.chunks.chunk(chunk).is_some()
    }

    fn respawn(&mut self, position: Vec3) {
        self.controller.respawn(position, &mut self.movement_events);
        self.input.reset();
        self.forward_movement_events();
        self.emit(GameEvent::Respawn { position });
    }

    /// Count `event` in the run stats and queue it for dispatch.
    fn emit(&mut self, event: GameEvent) {
        self.stats.record(&event);
        self.bus.publish(event);
    }

    fn forward_movement_events(&mut self) {
        let mut events = std::mem::take(&mut self.movement_events);
        for event in events.drain(..) {
            self.emit(GameEvent::Movement(event));
        }
        self.movement_events = events;
    }

    fn forward_world_events(&mut self) {
        let mut events = std::mem::take(&mut self.world_events);
        for event in events.drain(..) {
            self.emit(GameEvent::World(event));
        }
        self.world_events = events;
    }
}
