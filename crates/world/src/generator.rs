//! Chunk generation.
//!
//! A chunk is laid out along a straight line from its entry point. A cursor
//! walks that line and places (gap, platform) slots until the chunk's length
//! budget runs out. Every slot is checked against three limits before it is
//! accepted:
//!
//! 1. **Reach**: the gap is at least `min_edge_gap` and at most what a sprint
//!    jump (or a bounce) can cover for the slot's rise and sideways shift
//! 2. **Height**: the platform top stays inside the chunk's height band and
//!    the global height range
//! 3. **Overlap**: the buffered footprint does not touch any platform of this
//!    chunk or the previous one
//!
//! A slot that fails is skipped rather than bent into an invalid layout.

use glam::{Quat, Vec3};
use parkour_physics::MovementConfig;

use crate::chunk::{Chunk, ChunkIndex, START_CHUNK};
use crate::config::GeneratorConfig;
use crate::pattern::Pattern;
use crate::platform::{
    Approach, CheckpointId, Footprint, Outline, PathSpan, Platform, PlatformId, PlatformKind,
};
use crate::random::SeededRng;
use crate::reach::JumpReach;

/// Ramps whose rise ends up smaller than this are built as flat platforms.
const MIN_RAMP_RISE: f32 = 0.25;

/// Shortest wall worth running on.
const MIN_WALL_LENGTH: f32 = 2.0;

/// Walls start below the launch height so a body that dipped still sees them.
const WALL_DEPTH: f32 = 2.0;

const WALL_THICKNESS: f32 = 0.5;

/// Everything needed to lay out one chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkRequest {
    pub index: ChunkIndex,
    /// Longitudinal coordinate of the entry point.
    pub start: f32,
    /// World position of the entry point; `y` is the start height.
    pub origin: Vec3,
    /// Heading of the previous chunk.
    pub heading: f32,
    /// Heading change for this chunk (clamped to `max_turn`).
    pub curvature: f32,
    /// Length budget.
    pub length: f32,
    /// Length of the platform the traveler launches from at the entry.
    pub runway: f32,
}

impl ChunkRequest {
    /// Request the chunk that continues `previous`.
    pub fn after(previous: &Chunk, length: f32, curvature: f32) -> Self {
        let runway = previous
            .walkable()
            .last()
            .map_or(0.0, |platform| platform.footprint.length);

        Self {
            index: previous.index + 1,
            start: previous.end,
            origin: previous.exit,
            heading: previous.heading,
            curvature,
            length,
            runway,
        }
    }
}

/// How the traveler leaves the last placed platform.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Launch {
    Run,
    Bounce { force: f32, pad_length: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GapPreference {
    /// Anywhere in the allowed range.
    Any,
    /// Lower half of the allowed range.
    Easy,
    /// Upper half of the allowed range.
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SlotKind {
    Basic,
    Ramp { rise: f32 },
    BouncePad,
    Checkpoint,
}

/// One platform the layout tries to place.
#[derive(Debug, Clone, Copy)]
struct Slot {
    kind: SlotKind,
    width: f32,
    length: f32,
    /// The platform may be shortened down to this to fit the budget.
    min_length: f32,
    /// Desired height of the near edge above the current height.
    rise: f32,
    /// Sideways offset of the platform center from the centerline.
    lateral: f32,
    gap: GapPreference,
    /// Put a run-along wall on this side of the gap (+1 or -1).
    wall: Option<f32>,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    platforms: usize,
    cursor: f32,
    height: f32,
    lateral: f32,
    last_length: f32,
    launch: Launch,
}

/// Next free platform and checkpoint ids.
#[derive(Debug, Clone, Copy)]
struct IdCounters {
    platform: PlatformId,
    checkpoint: CheckpointId,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            platform: 1,
            checkpoint: 1,
        }
    }
}

/// Produces chunks whose gaps, heights and footprints respect the movement
/// controller's limits.
#[derive(Debug, Clone)]
pub struct ChunkGenerator {
    config: GeneratorConfig,
    reach: JumpReach,
    rng: SeededRng,
    ids: IdCounters,
    previous_pattern: Option<Pattern>,
}

impl ChunkGenerator {
    pub fn new(config: GeneratorConfig, movement: &MovementConfig) -> Self {
        Self {
            rng: SeededRng::new(config.seed),
            reach: JumpReach::from_movement(movement),
            ids: IdCounters::default(),
            previous_pattern: None,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn reach(&self) -> JumpReach {
        self.reach
    }

    /// Pattern of the most recently generated chunk.
    pub fn previous_pattern(&self) -> Option<Pattern> {
        self.previous_pattern
    }

    /// Rewind to the state right after construction.
    pub fn reset(&mut self) {
        self.rng = SeededRng::new(self.config.seed);
        self.ids = IdCounters::default();
        self.previous_pattern = None;
    }

    /// Build the first chunk: a large flat start platform centered on
    /// `center` followed by `easy_platforms` level platforms with short gaps.
    pub fn generate_start(
        &mut self,
        center: Vec3,
        start_width: f32,
        start_length: f32,
        easy_platforms: u32,
    ) -> Chunk {
        let origin = center - Vec3::Z * (start_length * 0.5);
        let request = ChunkRequest {
            index: START_CHUNK,
            start: 0.0,
            origin,
            heading: 0.0,
            curvature: 0.0,
            length: start_length + self.config.chunk_length,
            runway: 0.0,
        };

        let start_id = self.next_platform_id();
        let start_platform = Platform::new(
            start_id,
            PlatformKind::Basic,
            Footprint {
                center,
                width: start_width,
                length: start_length,
                yaw: 0.0,
            },
            self.config.platform_thickness,
        )
        .with_span(PathSpan {
            start: 0.0,
            end: start_length,
            lateral: 0.0,
        });

        let mut layout = Layout::new(&self.config, self.reach, &mut self.rng, &mut self.ids, &request, &[]);
        layout.push_placed(start_platform, start_length);

        for _ in 0..easy_platforms {
            let slot = layout.easy_slot();
            if !layout.place(slot) {
                break;
            }
        }

        let chunk = layout.finish(Pattern::Start, None);
        self.previous_pattern = Some(Pattern::Start);
        log::info!(
            "generated start chunk: {} platforms, length {:.1}",
            chunk.platforms.len(),
            chunk.length()
        );
        chunk
    }

    /// Lay out the chunk described by `request`.
    ///
    /// `previous` is the chunk this one continues from; its platforms take
    /// part in the overlap test.
    pub fn generate(&mut self, request: &ChunkRequest, previous: Option<&Chunk>) -> Chunk {
        let pattern = Pattern::choose(&mut self.rng, self.previous_pattern);
        let checkpoint = self.config.checkpoint_every > 0
            && request.index > 0
            && request.index % u64::from(self.config.checkpoint_every) == 0;

        let neighbours: Vec<Outline> = previous
            .map(|chunk| {
                chunk
                    .platforms
                    .iter()
                    .map(|platform| platform.outline(self.config.overlap_buffer))
                    .collect()
            })
            .unwrap_or_default();

        let mut checkpoint_id = None;
        if checkpoint {
            checkpoint_id = Some(self.ids.checkpoint);
            self.ids.checkpoint += 1;
        }

        let mut layout = Layout::new(
            &self.config,
            self.reach,
            &mut self.rng,
            &mut self.ids,
            request,
            &neighbours,
        );

        if let Some(id) = checkpoint_id {
            let slot = layout.checkpoint_slot();
            if !layout.place_checkpoint(slot, id) {
                log::warn!("chunk {}: checkpoint {id} did not fit", request.index);
                checkpoint_id = None;
            }
        }

        layout.fill(pattern);

        if layout.walkable_count() == 0 {
            let slot = layout.fallback_slot();
            if !layout.place(slot) {
                log::warn!("chunk {}: no platform could be placed", request.index);
            }
        }

        let chunk = layout.finish(pattern, checkpoint_id);
        self.previous_pattern = Some(pattern);

        log::info!(
            "generated chunk {} ({}): {} platforms, {:.1}..{:.1}, height {:.2} -> {:.2}",
            chunk.index,
            pattern.name(),
            chunk.platforms.len(),
            chunk.start,
            chunk.end,
            chunk.start_height,
            chunk.end_height
        );
        chunk
    }

    fn next_platform_id(&mut self) -> PlatformId {
        let id = self.ids.platform;
        self.ids.platform += 1;
        id
    }
}

/// Cursor state while one chunk is being laid out.
struct Layout<'a> {
    config: &'a GeneratorConfig,
    reach: JumpReach,
    rng: &'a mut SeededRng,
    ids: &'a mut IdCounters,
    neighbours: &'a [Outline],

    index: ChunkIndex,
    start: f32,
    origin: Vec3,
    heading: f32,
    forward: Vec3,
    side: Vec3,
    limit: f32,
    /// Lowest and highest allowed platform top in this chunk.
    band: (f32, f32),

    cursor: f32,
    height: f32,
    lateral: f32,
    last_length: f32,
    launch: Launch,
    platforms: Vec<Platform>,
}

impl<'a> Layout<'a> {
    fn new(
        config: &'a GeneratorConfig,
        reach: JumpReach,
        rng: &'a mut SeededRng,
        ids: &'a mut IdCounters,
        request: &ChunkRequest,
        neighbours: &'a [Outline],
    ) -> Self {
        let turn = request.curvature.clamp(-config.max_turn, config.max_turn);
        let heading = (request.heading + turn).clamp(-config.max_heading, config.max_heading);
        let rotation = Quat::from_rotation_y(heading);
        let start_height = request.origin.y;
        let band = (
            config.min_height.max(start_height - config.max_height_delta),
            config.max_height.min(start_height + config.max_height_delta),
        );

        Self {
            config,
            reach,
            rng,
            ids,
            neighbours,
            index: request.index,
            start: request.start,
            origin: request.origin,
            heading,
            forward: rotation * Vec3::Z,
            side: rotation * Vec3::X,
            limit: request.length,
            band,
            cursor: 0.0,
            height: start_height,
            lateral: 0.0,
            last_length: request.runway,
            launch: Launch::Run,
            platforms: Vec::new(),
        }
    }

    // ========================================================================
    // Patterns
    // ========================================================================

    fn fill(&mut self, pattern: Pattern) {
        let mut side = self.rng.sign();

        loop {
            let placed = match pattern {
                Pattern::Start => false,
                Pattern::StraightRun => {
                    let slot = self.straight_slot();
                    self.place(slot)
                }
                Pattern::SteppingStones | Pattern::Zigzag => {
                    side = -side;
                    let slot = self.offset_slot(pattern, side);
                    self.place(slot)
                }
                Pattern::RampUp | Pattern::RampDown => {
                    let slot = self.ramp_slot(pattern);
                    self.ensure_runway(pattern) && self.place(slot)
                }
                Pattern::BounceJump => {
                    if self.ensure_runway(pattern) {
                        let mark = self.mark();
                        let pad = self.pad_slot();
                        let placed = self.place(pad) && {
                            let landing = self.bounce_landing_slot();
                            self.place(landing)
                        };
                        if !placed {
                            self.rollback(mark);
                        }
                        placed
                    } else {
                        false
                    }
                }
                Pattern::WallRun => {
                    let slot = self.wall_landing_slot();
                    self.ensure_runway(pattern) && self.place(slot)
                }
            };

            if !placed || self.remaining() < self.config.min_edge_gap + self.min_platform() {
                break;
            }
        }
    }

    /// Place a full-length runway first unless the last platform already is one.
    fn ensure_runway(&mut self, pattern: Pattern) -> bool {
        if !pattern.needs_runway() || self.last_length >= self.config.min_runway {
            return true;
        }
        let slot = self.runway_slot();
        self.place(slot)
    }

    fn straight_slot(&mut self) -> Slot {
        let config = self.config;
        Slot {
            kind: SlotKind::Basic,
            width: self.rng.range(config.platform_min_width, config.platform_max_width),
            length: self.rng.range(config.platform_min_length, config.platform_max_length),
            min_length: config.platform_min_length,
            rise: self.rng.range(-1.0, config.max_step_up * 0.8),
            lateral: self.lateral,
            gap: GapPreference::Any,
            wall: None,
        }
    }

    fn offset_slot(&mut self, pattern: Pattern, side: f32) -> Slot {
        let config = self.config;
        let (width, length, min_length) = if pattern == Pattern::SteppingStones {
            let size = self.rng.range(config.stone_min_size, config.stone_max_size);
            (size, size, config.stone_min_size)
        } else {
            let max_length = (config.platform_max_length * 0.6).max(config.platform_min_length);
            (
                self.rng.range(config.platform_min_width, config.platform_max_width.min(4.0)),
                self.rng.range(config.platform_min_length, max_length),
                config.platform_min_length,
            )
        };

        Slot {
            kind: SlotKind::Basic,
            width,
            length,
            min_length,
            rise: self.rng.range(-0.5, 0.5),
            lateral: side * pattern.lateral_step(),
            gap: GapPreference::Any,
            wall: None,
        }
    }

    fn runway_slot(&mut self) -> Slot {
        let config = self.config;
        let min_length = config.min_runway.max(config.platform_min_length);
        Slot {
            kind: SlotKind::Basic,
            width: self.rng.range(config.platform_min_width, config.platform_max_width),
            length: self.rng.range(min_length, config.platform_max_length.max(min_length)),
            min_length,
            rise: self.rng.range(-0.5, 0.5),
            lateral: self.lateral,
            gap: GapPreference::Easy,
            wall: None,
        }
    }

    fn ramp_slot(&mut self, pattern: Pattern) -> Slot {
        let config = self.config;
        let direction = if pattern == Pattern::RampUp { 1.0 } else { -1.0 };
        let min_length = config.min_runway.max(config.platform_min_length);
        Slot {
            kind: SlotKind::Ramp {
                rise: direction * self.rng.range(1.0, 3.0),
            },
            width: self.rng.range(config.platform_min_width.max(3.0), config.platform_max_width.max(3.0)),
            length: self.rng.range(min_length, config.platform_max_length.max(min_length)),
            min_length,
            rise: 0.0,
            lateral: self.lateral,
            gap: GapPreference::Easy,
            wall: None,
        }
    }

    fn pad_slot(&mut self) -> Slot {
        let config = self.config;
        Slot {
            kind: SlotKind::BouncePad,
            width: self.rng.range(3.0, 4.0),
            length: self.rng.range(2.5, 3.0),
            min_length: 2.5,
            rise: self.rng.range(-0.5, 0.0),
            lateral: self.lateral,
            gap: GapPreference::Easy,
            wall: None,
        }
        .fit_width(config)
    }

    fn bounce_landing_slot(&mut self) -> Slot {
        let config = self.config;
        let climb = self.bounce_step_up();
        let min_length = 4.0f32.max(config.platform_min_length);
        Slot {
            kind: SlotKind::Basic,
            width: self.rng.range(config.platform_min_width, config.platform_max_width),
            length: self.rng.range(min_length, config.platform_max_length.max(min_length)),
            min_length,
            rise: self.rng.range(climb * 0.5, climb),
            lateral: self.lateral,
            gap: GapPreference::Any,
            wall: None,
        }
    }

    fn wall_landing_slot(&mut self) -> Slot {
        let config = self.config;
        let min_length = config.min_runway.max(config.platform_min_length);
        Slot {
            kind: SlotKind::Basic,
            width: self.rng.range(config.platform_min_width, config.platform_max_width),
            length: self.rng.range(min_length, config.platform_max_length.max(min_length)),
            min_length,
            rise: self.rng.range(-1.0, 0.3),
            lateral: self.lateral,
            gap: GapPreference::Long,
            wall: Some(self.rng.sign()),
        }
    }

    fn checkpoint_slot(&self) -> Slot {
        Slot {
            kind: SlotKind::Checkpoint,
            width: self.config.checkpoint_width,
            length: self.config.checkpoint_length,
            min_length: self.config.checkpoint_length,
            rise: 0.0,
            lateral: 0.0,
            gap: GapPreference::Easy,
            wall: None,
        }
    }

    fn easy_slot(&mut self) -> Slot {
        let config = self.config;
        let min_length = config.min_runway.max(config.platform_min_length);
        Slot {
            kind: SlotKind::Basic,
            width: config.platform_max_width,
            length: self.rng.range(min_length, config.platform_max_length.max(min_length)),
            min_length,
            rise: 0.0,
            lateral: 0.0,
            gap: GapPreference::Easy,
            wall: None,
        }
    }

    fn fallback_slot(&self) -> Slot {
        Slot {
            kind: SlotKind::Basic,
            width: self.config.platform_max_width,
            length: self.config.platform_min_length,
            min_length: self.config.platform_min_length,
            rise: 0.0,
            lateral: self.lateral,
            gap: GapPreference::Easy,
            wall: None,
        }
    }

    // ========================================================================
    // Placement
    // ========================================================================

    fn place_checkpoint(&mut self, slot: Slot, id: CheckpointId) -> bool {
        self.place_kind(slot, Some(id))
    }

    fn place(&mut self, slot: Slot) -> bool {
        self.place_kind(slot, None)
    }

    fn place_kind(&mut self, slot: Slot, checkpoint: Option<CheckpointId>) -> bool {
        let config = self.config;
        let shift = (slot.lateral - self.lateral).abs();

        let mut rise = self.clamp_rise(slot.rise);
        let mut cap = self.allowed_gap(rise, shift);
        if cap.is_none() && rise > 0.0 {
            rise = self.clamp_rise(0.0);
            cap = self.allowed_gap(rise, shift);
        }
        let Some(cap) = cap else {
            log::warn!(
                "chunk {}: skipping slot, rise {rise:.2} with shift {shift:.2} is out of reach",
                self.index
            );
            return false;
        };

        let min_gap = config.min_edge_gap;
        let mid = (min_gap + cap) * 0.5;
        let mut gap = match slot.gap {
            GapPreference::Any => self.rng.range(min_gap, cap),
            GapPreference::Easy => self.rng.range(min_gap, mid),
            GapPreference::Long => self.rng.range(mid, cap),
        };

        let mut length = slot.length;
        if self.cursor + gap + length > self.limit {
            gap = min_gap;
            length = (self.limit - self.cursor - gap).min(slot.length);
            if length < slot.min_length {
                log::debug!(
                    "chunk {}: no room for another platform ({:.2} m left)",
                    self.index,
                    self.remaining()
                );
                return false;
            }
        }

        let ramp_rise = match slot.kind {
            SlotKind::Ramp { rise: wanted } => {
                let entry = self.height + rise;
                let exit = (entry + wanted).clamp(self.band.0, self.band.1);
                exit - entry
            }
            _ => 0.0,
        };

        let kind = match slot.kind {
            SlotKind::Basic => PlatformKind::Basic,
            SlotKind::Ramp { .. } if ramp_rise.abs() < MIN_RAMP_RISE => PlatformKind::Basic,
            SlotKind::Ramp { .. } => PlatformKind::Ramp { rise: ramp_rise },
            SlotKind::BouncePad => PlatformKind::BouncePad {
                force: config.bounce_force,
            },
            SlotKind::Checkpoint => PlatformKind::Checkpoint {
                id: checkpoint.unwrap_or_default(),
                active: false,
            },
        };
        let ramp_rise = if matches!(kind, PlatformKind::Ramp { .. }) {
            ramp_rise
        } else {
            0.0
        };

        let near = self.cursor + gap;
        let mut center = self.at(near + length * 0.5, slot.lateral);
        center.y = self.height + rise + ramp_rise * 0.5;
        let footprint = Footprint {
            center,
            width: slot.width,
            length,
            yaw: self.heading,
        };

        let wall = match slot.wall {
            Some(side) => self.wall(side, gap),
            None => None,
        };

        let outline = footprint.outline(config.overlap_buffer);
        if self.overlaps(&outline) {
            log::warn!("chunk {}: skipping {} slot, footprint overlaps", self.index, kind.name());
            return false;
        }
        let wall = wall.filter(|wall| {
            let clear = !self.overlaps(&wall.outline(config.overlap_buffer))
                && !wall
                    .outline(config.overlap_buffer)
                    .overlaps(&outline);
            if !clear {
                log::warn!("chunk {}: dropping wall, footprint overlaps", self.index);
            }
            clear
        });

        let approach = Approach {
            gap,
            rise,
            lateral: shift,
            launch_force: match self.launch {
                Launch::Run => self.reach.jump_force,
                Launch::Bounce { force, .. } => force,
            },
            run_up: match self.launch {
                Launch::Run => 0.0,
                Launch::Bounce { pad_length, .. } => pad_length,
            },
        };

        if let Some(wall) = wall {
            self.platforms.push(wall);
        }

        let platform = Platform::new(self.next_id(), kind, footprint, config.platform_thickness)
            .with_span(PathSpan {
                start: self.start + near,
                end: self.start + near + length,
                lateral: slot.lateral,
            })
            .with_approach(approach);
        let launch = match kind {
            PlatformKind::BouncePad { force } => Launch::Bounce {
                force,
                pad_length: length,
            },
            _ => Launch::Run,
        };

        self.cursor = near + length;
        self.height = platform.exit_height();
        self.lateral = slot.lateral;
        self.last_length = length;
        self.launch = launch;
        self.platforms.push(platform);
        true
    }

    /// Add an already positioned platform (the start platform).
    fn push_placed(&mut self, platform: Platform, length: f32) {
        self.cursor += length;
        self.height = platform.exit_height();
        self.lateral = platform.span.lateral;
        self.last_length = length;
        self.launch = Launch::Run;
        self.platforms.push(platform);
    }

    /// Wall along the side of a gap that starts at the cursor.
    fn wall(&mut self, side: f32, gap: f32) -> Option<Platform> {
        let inset = self.config.overlap_buffer * 3.0;
        let length = gap - 2.0 * inset;
        if length < MIN_WALL_LENGTH {
            return None;
        }

        let lateral = self.lateral + side * (self.config.wall_offset + WALL_THICKNESS * 0.5);
        let mut base = self.at(self.cursor + gap * 0.5, lateral);
        base.y = self.height - WALL_DEPTH;

        let wall = Platform::new(
            self.next_id(),
            PlatformKind::WallRunSegment {
                height: self.config.wall_height + WALL_DEPTH,
            },
            Footprint {
                center: base,
                width: WALL_THICKNESS,
                length,
                yaw: self.heading,
            },
            WALL_THICKNESS,
        )
        .with_span(PathSpan {
            start: self.start + self.cursor + inset,
            end: self.start + self.cursor + inset + length,
            lateral,
        });
        Some(wall)
    }

    /// Clamp a desired rise by the step limits of the current launch and by
    /// the chunk's height band.
    fn clamp_rise(&self, rise: f32) -> f32 {
        let max_up = match self.launch {
            Launch::Run => self.config.max_step_up,
            Launch::Bounce { .. } => self.bounce_step_up(),
        };
        let rise = rise.clamp(-self.config.max_step_down, max_up);
        let target = (self.height + rise).clamp(self.band.0, self.band.1);
        target - self.height
    }

    /// Largest gap the traveler can cross onto a platform `rise` higher and
    /// `shift` to the side, or `None` when even `min_edge_gap` is too far.
    fn allowed_gap(&self, rise: f32, shift: f32) -> Option<f32> {
        let config = self.config;
        let (reach, run_up) = match self.launch {
            Launch::Run => (self.reach, 0.0),
            Launch::Bounce { force, pad_length } => (self.reach.with_launch(force), pad_length),
        };

        let distance = reach.distance(rise)? * config.reach_safety - run_up;
        let mut cap = JumpReach::diagonal_cap(distance, shift).min(config.max_edge_gap);
        if self.launch == Launch::Run && self.last_length < config.min_runway {
            cap = cap.min(config.mid_gap());
        }

        (cap >= config.min_edge_gap).then_some(cap)
    }

    fn bounce_step_up(&self) -> f32 {
        self.reach.with_launch(self.config.bounce_force).apex() * 0.7
    }

    fn overlaps(&self, outline: &Outline) -> bool {
        let buffer = self.config.overlap_buffer;
        self.neighbours.iter().any(|other| other.overlaps(outline))
            || self
                .platforms
                .iter()
                .any(|platform| platform.outline(buffer).overlaps(outline))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// World position at `distance` along the centerline and `lateral` to the side.
    fn at(&self, distance: f32, lateral: f32) -> Vec3 {
        let mut point = self.origin + self.forward * distance + self.side * lateral;
        point.y = self.origin.y;
        point
    }

    fn remaining(&self) -> f32 {
        self.limit - self.cursor
    }

    fn min_platform(&self) -> f32 {
        self.config.platform_min_length.min(self.config.stone_min_size)
    }

    fn walkable_count(&self) -> usize {
        self.platforms
            .iter()
            .filter(|platform| platform.kind.is_walkable())
            .count()
    }

    fn next_id(&mut self) -> PlatformId {
        let id = self.ids.platform;
        self.ids.platform += 1;
        id
    }

    fn mark(&self) -> Mark {
        Mark {
            platforms: self.platforms.len(),
            cursor: self.cursor,
            height: self.height,
            lateral: self.lateral,
            last_length: self.last_length,
            launch: self.launch,
        }
    }

    fn rollback(&mut self, mark: Mark) {
        self.platforms.truncate(mark.platforms);
        self.cursor = mark.cursor;
        self.height = mark.height;
        self.lateral = mark.lateral;
        self.last_length = mark.last_length;
        self.launch = mark.launch;
    }

    fn finish(self, pattern: Pattern, checkpoint: Option<CheckpointId>) -> Chunk {
        let exit = self
            .platforms
            .iter()
            .filter(|platform| platform.kind.is_walkable())
            .last()
            .map_or(self.origin, Platform::exit_point);

        Chunk {
            index: self.index,
            pattern,
            start: self.start,
            end: self.start + self.cursor,
            start_height: self.origin.y,
            end_height: exit.y,
            heading: self.heading,
            origin: self.origin,
            exit,
            platforms: self.platforms,
            checkpoint,
        }
    }
}

impl Slot {
    fn fit_width(mut self, config: &GeneratorConfig) -> Self {
        self.width = self.width.clamp(config.platform_min_width, config.platform_max_width);
        self
    }
}
