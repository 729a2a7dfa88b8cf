//! Streaming window.
//!
//! The [`ChunkManager`] keeps a deque of live chunks around the traveler:
//! `lookahead_chunks` worth of path ahead and `trailing_chunks` behind. It is
//! the only writer of the live [`CollisionWorld`]; each chunk's obstacles are
//! appended when it is generated and popped when it is disposed.

use std::collections::VecDeque;

use glam::Vec3;
use parkour_physics::CollisionWorld;

use crate::chunk::{Chunk, ChunkIndex};
use crate::config::StreamingConfig;
use crate::events::WorldEvent;
use crate::generator::{ChunkGenerator, ChunkRequest};
use crate::platform::{CheckpointId, Platform};
use crate::random::SeededRng;

/// Salt that separates the curvature stream from the layout stream.
const CURVATURE_SALT: u32 = 0x00C0_FFEE;

/// Owns the live chunks and the obstacle set they contribute.
#[derive(Debug)]
pub struct ChunkManager {
    config: StreamingConfig,
    generator: ChunkGenerator,
    chunks: VecDeque<Chunk>,
    world: CollisionWorld,
    curvature: SeededRng,
}

impl ChunkManager {
    /// Create an empty manager. Call [`Self::reset`] to build the start area.
    pub fn new(generator: ChunkGenerator, config: StreamingConfig) -> Self {
        let seed = generator.config().seed;
        Self {
            config,
            generator,
            chunks: VecDeque::new(),
            world: CollisionWorld::new(),
            curvature: SeededRng::derived(seed, CURVATURE_SALT),
        }
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }

    /// The live obstacle set, for the movement controller.
    pub fn world(&self) -> &CollisionWorld {
        &self.world
    }

    /// Live chunks, oldest first.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, index: ChunkIndex) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.index == index)
    }

    /// Longitudinal coordinate of the furthest generated point.
    pub fn frontier(&self) -> f32 {
        self.chunks.back().map_or(0.0, |chunk| chunk.end)
    }

    /// Window size ahead of the traveler before another chunk is generated.
    pub fn lookahead_distance(&self) -> f32 {
        self.config.lookahead_chunks as f32 * self.generator.config().chunk_length
    }

    /// Distance behind the traveler after which chunks are disposed.
    pub fn trailing_distance(&self) -> f32 {
        self.config.trailing_chunks as f32 * self.generator.config().chunk_length
    }

    /// Longitudinal coordinate of `position` along the path.
    ///
    /// The furthest chunk the position has entered wins; a position behind
    /// every chunk maps to the start of the oldest one.
    pub fn progress(&self, position: Vec3) -> f32 {
        self.chunks
            .iter()
            .filter_map(|chunk| chunk.progress(position))
            .fold(None, |best: Option<f32>, p| Some(best.map_or(p, |b| b.max(p))))
            .or_else(|| self.chunks.front().map(|chunk| chunk.start))
            .unwrap_or(0.0)
    }

    /// Dispose everything and rebuild the start area.
    ///
    /// The start platform is centered on `spawn`'s horizontal position with
    /// its top at `spawn.y`. The lookahead window is filled immediately.
    pub fn reset(&mut self, spawn: Vec3, events: &mut Vec<WorldEvent>) {
        while let Some(chunk) = self.chunks.pop_front() {
            self.release(&chunk, events);
        }
        self.world.clear_streamed();
        self.generator.reset();
        self.curvature = SeededRng::derived(self.generator.config().seed, CURVATURE_SALT);

        let start = self.generator.generate_start(
            spawn,
            self.config.start_platform_width,
            self.config.start_platform_length,
            self.config.easy_platforms,
        );
        self.admit(start, events);

        let progress = self.progress(spawn);
        while self.frontier() - progress < self.lookahead_distance() {
            if !self.generate_next(events) {
                break;
            }
        }
    }

    /// Grow and shrink the window around `position`.
    ///
    /// Generates at most one chunk per call. Disposes trailing chunks but
    /// never `pinned` or anything after it, so the active checkpoint and the
    /// path onward from it stay intact. The pin only holds up to
    /// `max_live_chunks`; beyond that the oldest chunk goes regardless, and
    /// the caller sees the pinned index in a `ChunkDisposed` event.
    pub fn update(
        &mut self,
        position: Vec3,
        pinned: Option<ChunkIndex>,
        dt: f32,
        events: &mut Vec<WorldEvent>,
    ) {
        let progress = self.progress(position);

        if self.frontier() - progress < self.lookahead_distance() {
            self.generate_next(events);
        }

        let threshold = progress - self.trailing_distance();
        while self.chunks.len() > 1 {
            let Some(front) = self.chunks.front() else {
                break;
            };
            if front.end >= threshold || Some(front.index) == pinned {
                break;
            }
            if let Some(chunk) = self.chunks.pop_front() {
                self.release(&chunk, events);
            }
        }

        while self.chunks.len() > self.config.max_live_chunks as usize {
            let Some(chunk) = self.chunks.pop_front() else {
                break;
            };
            if Some(chunk.index) == pinned {
                log::warn!("window full, releasing pinned chunk {}", chunk.index);
            }
            self.release(&chunk, events);
        }

        for chunk in &mut self.chunks {
            chunk.tick(dt);
        }
    }

    /// Flag `active` as the only active checkpoint (or none), in one pass.
    pub fn mark_active(&mut self, active: Option<CheckpointId>) {
        for chunk in &mut self.chunks {
            for platform in &mut chunk.platforms {
                if let Some(id) = platform.checkpoint_id() {
                    platform.set_active(Some(id) == active);
                }
            }
        }
    }

    /// Every live checkpoint platform with the chunk that owns it.
    pub fn checkpoints(&self) -> impl Iterator<Item = (ChunkIndex, &Platform)> {
        self.chunks.iter().flat_map(|chunk| {
            chunk
                .platforms
                .iter()
                .filter(|platform| platform.checkpoint_id().is_some())
                .map(move |platform| (chunk.index, platform))
        })
    }

    fn generate_next(&mut self, events: &mut Vec<WorldEvent>) -> bool {
        let Some(previous) = self.chunks.back() else {
            return false;
        };

        let curvature = self.curvature.range(-1.0, 1.0) * self.generator.config().max_turn;
        let request = ChunkRequest::after(previous, self.generator.config().chunk_length, curvature);
        let chunk = self.generator.generate(&request, Some(previous));
        let grew = chunk.end > chunk.start;
        self.admit(chunk, events);
        grew
    }

    fn admit(&mut self, chunk: Chunk, events: &mut Vec<WorldEvent>) {
        self.world.push_chunk(chunk.index, chunk.obstacles());
        events.push(WorldEvent::ChunkGenerated {
            index: chunk.index,
            position: chunk.origin,
            height: chunk.end_height,
        });
        self.chunks.push_back(chunk);
    }

    fn release(&mut self, chunk: &Chunk, events: &mut Vec<WorldEvent>) {
        let released = self.world.pop_chunk(chunk.index);
        log::info!(
            "disposed chunk {} ({} obstacles, {:.1}..{:.1})",
            chunk.index,
            released,
            chunk.start,
            chunk.end
        );
        events.push(WorldEvent::ChunkDisposed { index: chunk.index });
    }
}
