//! Parkour movement controller.
//!
//! This is the main entry point for movement. It owns the body, takes one
//! input per tick and moves the body through a borrowed collision world.

use glam::{Vec2, Vec3};

use crate::collision::{CollisionProbe, CollisionWorld, GroundHit};

use super::config::MovementConfig;
use super::events::MovementEvent;
use super::jump::{self, JumpKind};
use super::slide;
use super::state::{ActionSet, KinematicBody, MovementInput, MovementMode, Timers};
use super::wall_run;

/// Kinematic movement controller.
///
/// Each tick runs in a fixed order:
///
/// 1. clamp the elapsed time and count timers down
/// 2. crouch and slide input
/// 3. horizontal movement (momentum only while sliding)
/// 4. jump, coyote jump or wall jump
/// 5. wall-run physics
/// 6. gravity (airborne only, skipped on the tick of a jump)
/// 7. integrate Y, then X, then Z against the collision world
/// 8. refresh ground, wall and height state
///
/// # Example
///
/// ```ignore
/// let mut controller = MovementController::new(MovementConfig::default(), spawn);
/// let mut events = Vec::new();
///
/// // Each frame:
/// controller.update(&world, &input, delta_time, &mut events);
/// ```
#[derive(Debug, Clone)]
pub struct MovementController {
    config: MovementConfig,
    body: KinematicBody,
    timers: Timers,
}

impl MovementController {
    /// Create a controller with a standing body at `spawn`.
    pub fn new(config: MovementConfig, spawn: Vec3) -> Self {
        let body = KinematicBody::new(spawn, config.standing_height, config.eye_height_standing);
        Self {
            config,
            body,
            timers: Timers::default(),
        }
    }

    /// Movement configuration.
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Current kinematic state.
    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    /// Current timers.
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Current movement mode.
    pub fn mode(&self) -> MovementMode {
        self.body.mode
    }

    /// Teleport to `position` at rest, standing and grounded.
    ///
    /// Any active sprint, crouch, slide or wall-run is closed with its end
    /// event first.
    pub fn respawn(&mut self, position: Vec3, events: &mut Vec<MovementEvent>) {
        if self.body.sprinting {
            events.push(MovementEvent::SprintEnd);
        }
        match self.body.mode {
            MovementMode::Crouching => events.push(MovementEvent::CrouchEnd),
            MovementMode::Sliding => events.push(MovementEvent::SlideEnd),
            MovementMode::WallRunning => events.push(MovementEvent::WallRunEnd),
            MovementMode::Grounded | MovementMode::Airborne => {}
        }

        let yaw = self.body.yaw;
        self.body = KinematicBody::new(
            position,
            self.config.standing_height,
            self.config.eye_height_standing,
        );
        self.body.yaw = yaw;
        self.timers = Timers::default();
        log::trace!("respawned at {:?}", position);
    }

    /// Ask for a stance change from outside the controller.
    ///
    /// Only stance edges are accepted: crouch, stand up, slide and end a
    /// slide. Each runs the same path as player input and emits the same
    /// events. Airborne and wall-run edges belong to the physics and are
    /// rejected, as is any edge the state machine has no arrow for; the mode
    /// is left unchanged and `false` is returned.
    pub fn request_mode(
        &mut self,
        world: &CollisionWorld,
        next: MovementMode,
        events: &mut Vec<MovementEvent>,
    ) -> bool {
        let current = self.body.mode;
        match (current, next) {
            (MovementMode::Grounded, MovementMode::Crouching) => self.start_crouch(events),
            (MovementMode::Crouching, MovementMode::Grounded) => {
                self.stand_up(&CollisionProbe::new(world), events)
            }
            (MovementMode::Grounded | MovementMode::Crouching, MovementMode::Sliding) => {
                self.start_slide(events)
            }
            (MovementMode::Sliding, MovementMode::Crouching) => self.end_slide(events),
            _ => {
                log::debug!("rejected requested transition {:?} -> {:?}", current, next);
                false
            }
        }
    }

    /// Advance the body by one tick.
    ///
    /// # Arguments
    ///
    /// * `world` - Obstacles to collide with
    /// * `input` - This tick's input
    /// * `delta_time` - Elapsed seconds, clamped to `max_delta`
    /// * `events` - Movement events are appended here
    ///
    /// # Returns
    ///
    /// The clamped time step actually simulated.
    pub fn update(
        &mut self,
        world: &CollisionWorld,
        input: &MovementInput,
        delta_time: f32,
        events: &mut Vec<MovementEvent>,
    ) -> f32 {
        let dt = clamp_delta(delta_time, self.config.max_delta);
        if dt <= 0.0 {
            return 0.0;
        }

        let probe = CollisionProbe::new(world);

        self.body.yaw = input.yaw;
        self.timers.tick(dt);
        if input.actions.just_pressed(ActionSet::JUMP) {
            self.timers.jump_buffer = self.config.jump_buffer;
        }

        self.update_crouch(&probe, input, events);
        self.update_sprint(input, dt, events);

        match self.body.mode {
            MovementMode::Sliding => self.slide_move(dt, events),
            MovementMode::WallRunning => {}
            _ => self.accelerate(input, dt),
        }

        let jumped = self.update_jump(events);

        if self.body.mode == MovementMode::WallRunning {
            self.wall_run_move(dt, events);
        }

        if self.body.mode == MovementMode::Airborne && !jumped {
            self.body.velocity.y =
                (self.body.velocity.y - self.config.gravity * dt).max(-self.config.terminal_velocity);
        }

        self.integrate(&probe, dt, events);
        self.refresh(&probe, dt, events);

        dt
    }

    // ========================================================================
    // Mode Changes
    // ========================================================================

    fn set_mode(&mut self, next: MovementMode) -> bool {
        let current = self.body.mode;
        if !current.can_transition_to(next) {
            log::debug!("rejected movement transition {:?} -> {:?}", current, next);
            return false;
        }

        log::trace!("movement {:?} -> {:?}", current, next);
        self.body.mode = next;

        // Shrinking is always safe; growing waits for clearance
        let height = self.config.height(next);
        if height < self.body.height {
            self.body.height = height;
        }
        true
    }

    // ========================================================================
    // Crouching and Sliding
    // ========================================================================

    fn update_crouch(
        &mut self,
        probe: &CollisionProbe<'_>,
        input: &MovementInput,
        events: &mut Vec<MovementEvent>,
    ) {
        if !input.actions.just_pressed(ActionSet::CROUCH) {
            return;
        }

        match self.body.mode {
            MovementMode::Grounded | MovementMode::Crouching if self.can_slide() => {
                self.start_slide(events);
            }
            MovementMode::Grounded => {
                self.start_crouch(events);
            }
            MovementMode::Crouching => {
                self.stand_up(probe, events);
            }
            MovementMode::Sliding => {
                self.end_slide(events);
            }
            MovementMode::Airborne | MovementMode::WallRunning => {
                log::debug!("crouch ignored while {:?}", self.body.mode);
            }
        }
    }

    fn start_crouch(&mut self, events: &mut Vec<MovementEvent>) -> bool {
        if !self.set_mode(MovementMode::Crouching) {
            return false;
        }
        events.push(MovementEvent::CrouchStart);
        true
    }

    fn stand_up(&mut self, probe: &CollisionProbe<'_>, events: &mut Vec<MovementEvent>) -> bool {
        let clear = probe.can_stand(
            self.body.position,
            self.config.radius,
            self.body.height,
            self.config.standing_height,
        );
        if !clear {
            log::debug!("stand-up blocked at {:?}", self.body.position);
            return false;
        }
        if !self.set_mode(MovementMode::Grounded) {
            return false;
        }
        events.push(MovementEvent::CrouchEnd);
        true
    }

    fn can_slide(&self) -> bool {
        self.timers.sprint_duration >= self.config.min_sprint_for_slide
            && self.timers.slide_cooldown <= 0.0
    }

    fn start_slide(&mut self, events: &mut Vec<MovementEvent>) -> bool {
        let from = self.body.mode;
        if !self.set_mode(MovementMode::Sliding) {
            return false;
        }
        if from == MovementMode::Crouching {
            events.push(MovementEvent::CrouchEnd);
        }

        let horizontal = Vec3::new(self.body.velocity.x, 0.0, self.body.velocity.z);
        let direction = horizontal
            .try_normalize()
            .unwrap_or_else(|| self.body.forward());

        self.body.slide_direction = direction;
        self.body.slide_speed = slide::start_speed(horizontal.length(), &self.config);
        self.body.velocity.x = direction.x * self.body.slide_speed;
        self.body.velocity.z = direction.z * self.body.slide_speed;
        self.timers.slide_elapsed = 0.0;

        events.push(MovementEvent::SlideStart);
        true
    }

    /// A slide always ends crouched.
    fn end_slide(&mut self, events: &mut Vec<MovementEvent>) -> bool {
        if !self.set_mode(MovementMode::Crouching) {
            return false;
        }
        self.timers.slide_cooldown = self.config.slide_cooldown;
        events.push(MovementEvent::SlideEnd);
        events.push(MovementEvent::CrouchStart);
        true
    }

    fn slide_move(&mut self, dt: f32, events: &mut Vec<MovementEvent>) {
        if !slide::advance(&mut self.body, &mut self.timers, &self.config, dt) {
            self.end_slide(events);
        }
    }

    // ========================================================================
    // Horizontal Movement
    // ========================================================================

    fn update_sprint(&mut self, input: &MovementInput, dt: f32, events: &mut Vec<MovementEvent>) {
        let intent = input.actions.is_held(ActionSet::SPRINT) && input.has_movement();
        let sprinting = intent && self.body.mode.allows_sprint();

        // Sprint held while crouched still counts toward a slide
        if sprinting || (intent && self.body.mode == MovementMode::Crouching) {
            self.timers.sprint_duration += dt;
        } else {
            self.timers.sprint_duration = 0.0;
        }

        if sprinting != self.body.sprinting {
            self.body.sprinting = sprinting;
            events.push(if sprinting {
                MovementEvent::SprintStart
            } else {
                MovementEvent::SprintEnd
            });
        }
    }

    /// Critically damped approach toward the target velocity.
    fn accelerate(&mut self, input: &MovementInput, dt: f32) {
        let wish = input.wish_direction();
        let target = wish * self.config.target_speed(self.body.mode, self.body.sprinting);

        let mut rate = if wish == Vec3::ZERO {
            self.config.ground_decel_rate
        } else {
            self.config.ground_accel_rate
        };
        if self.body.mode == MovementMode::Airborne {
            rate *= self.config.air_control;
        }

        let blend = 1.0 - (-rate * dt).exp();
        let current = Vec2::new(self.body.velocity.x, self.body.velocity.z);
        let next = current.lerp(Vec2::new(target.x, target.z), blend);
        self.body.velocity.x = next.x;
        self.body.velocity.z = next.y;
    }

    // ========================================================================
    // Jumping and Wall Running
    // ========================================================================

    fn update_jump(&mut self, events: &mut Vec<MovementEvent>) -> bool {
        let Some(kind) = jump::pending_jump(self.body.mode, &self.timers) else {
            return false;
        };

        match kind {
            JumpKind::Ground => {
                let from = self.body.mode;
                if !self.set_mode(MovementMode::Airborne) {
                    return false;
                }
                match from {
                    MovementMode::Crouching => events.push(MovementEvent::CrouchEnd),
                    MovementMode::Sliding => {
                        self.timers.slide_cooldown = self.config.slide_cooldown;
                        events.push(MovementEvent::SlideEnd);
                    }
                    _ => {}
                }
                self.body.velocity.y = self.config.jump_force;
            }
            JumpKind::Coyote => {
                self.body.velocity.y = self.config.jump_force;
            }
            JumpKind::Wall => {
                if !self.set_mode(MovementMode::Airborne) {
                    return false;
                }
                self.body.velocity =
                    jump::wall_jump_velocity(self.body.velocity, self.body.wall_normal, &self.config);
                wall_run::detach(&mut self.timers, &self.config);
                events.push(MovementEvent::WallRunEnd);
                events.push(MovementEvent::WallJump);
            }
        }

        jump::consume(&mut self.timers, &self.config);
        events.push(MovementEvent::Jump);
        true
    }

    fn wall_run_move(&mut self, dt: f32, events: &mut Vec<MovementEvent>) {
        if !wall_run::advance(&mut self.body, &mut self.timers, &self.config, dt) {
            self.leave_wall(events);
        }
    }

    fn leave_wall(&mut self, events: &mut Vec<MovementEvent>) {
        if self.set_mode(MovementMode::Airborne) {
            wall_run::detach(&mut self.timers, &self.config);
            events.push(MovementEvent::WallRunEnd);
        }
    }

    // ========================================================================
    // Integration
    // ========================================================================

    fn integrate(&mut self, probe: &CollisionProbe<'_>, dt: f32, events: &mut Vec<MovementEvent>) {
        self.move_vertical(probe, dt, events);

        let blocked_x = self.move_axis(probe, Vec3::X * self.body.velocity.x * dt);
        if blocked_x {
            self.body.velocity.x = 0.0;
        }
        let blocked_z = self.move_axis(probe, Vec3::Z * self.body.velocity.z * dt);
        if blocked_z {
            self.body.velocity.z = 0.0;
        }

        if (blocked_x || blocked_z) && self.body.mode == MovementMode::Sliding {
            slide::sync_from_velocity(&mut self.body);
        }
    }

    fn move_vertical(&mut self, probe: &CollisionProbe<'_>, dt: f32, events: &mut Vec<MovementEvent>) {
        let dy = self.body.velocity.y * dt;

        if dy > 0.0 {
            let head = self.body.position + Vec3::Y * self.body.height;
            match probe.ceiling(head, self.config.radius, dy) {
                Some(hit) => {
                    self.body.position.y += hit.distance;
                    self.body.velocity.y = 0.0;
                }
                None => self.body.position.y += dy,
            }
            return;
        }

        if self.body.mode.is_grounded() {
            // Grounded modes follow the surface in refresh
            return;
        }

        let step = self.config.step_height;
        let new_y = self.body.position.y + dy;
        let ground = probe.ground(
            self.body.position + Vec3::Y * step,
            self.config.radius,
            self.config.ground_sample_rings,
            step - dy + self.config.ground_probe_distance,
        );

        match ground {
            Some(ground) if ground.height >= new_y - self.config.ground_probe_distance => {
                self.body.position.y = ground.height;
                self.touch_down(ground, events);
            }
            _ => self.body.position.y = new_y,
        }
    }

    fn touch_down(&mut self, ground: GroundHit, events: &mut Vec<MovementEvent>) {
        let impact = (-self.body.velocity.y).max(0.0);
        self.body.ground_normal = ground.normal;

        if let Some(force) = ground.tags.bounce_force {
            if self.body.velocity.y < 0.0 {
                if self.body.mode == MovementMode::WallRunning {
                    self.leave_wall(events);
                }
                self.body.velocity.y = force;
                self.timers.coyote = 0.0;
                events.push(MovementEvent::Bounce { force });
                return;
            }
        }

        self.body.velocity.y = 0.0;
        if self.body.mode == MovementMode::WallRunning {
            // Refresh drops the run now that there is ground underfoot
            return;
        }

        if self.set_mode(MovementMode::Grounded) {
            self.timers.coyote = 0.0;
            events.push(MovementEvent::Land { impact });
            // A press buffered before touchdown fires now
            self.update_jump(events);
        }
    }

    /// Move by `delta` unless the body box would penetrate something.
    ///
    /// The box starts `step_height` above the feet so low lips are stepped
    /// over and picked up by the ground probe instead.
    fn move_axis(&mut self, probe: &CollisionProbe<'_>, delta: Vec3) -> bool {
        if delta == Vec3::ZERO {
            return false;
        }

        let target = self.body.position + delta;
        let half_height = (self.body.height - self.config.step_height) * 0.5;
        let center = target + Vec3::Y * (self.config.step_height + half_height);
        let half_extents = Vec3::new(self.config.radius, half_height, self.config.radius);

        if probe.overlaps_box(center, half_extents) {
            return true;
        }

        self.body.position = target;
        false
    }

    // ========================================================================
    // State Refresh
    // ========================================================================

    fn refresh(&mut self, probe: &CollisionProbe<'_>, dt: f32, events: &mut Vec<MovementEvent>) {
        match self.body.mode {
            MovementMode::Grounded | MovementMode::Crouching | MovementMode::Sliding => {
                self.follow_ground(probe, events);
            }
            MovementMode::Airborne => self.try_attach_wall(probe, events),
            MovementMode::WallRunning => self.check_wall(probe, events),
        }

        let target = self.config.height(self.body.mode);
        if self.body.height > target {
            self.body.height = target;
        } else if self.body.height < target
            && probe.can_stand(self.body.position, self.config.radius, self.body.height, target)
        {
            self.body.height = target;
        }

        let eye_target = self.config.eye_height(self.body.mode).min(self.body.height);
        let blend = 1.0 - (-self.config.eye_lerp_rate * dt).exp();
        self.body.eye_height += (eye_target - self.body.eye_height) * blend;
    }

    fn follow_ground(&mut self, probe: &CollisionProbe<'_>, events: &mut Vec<MovementEvent>) {
        let step = self.config.step_height;
        let ground = probe.ground(
            self.body.position + Vec3::Y * step,
            self.config.radius,
            self.config.ground_sample_rings,
            step + self.config.ground_snap_distance,
        );

        if let Some(ground) = ground {
            self.body.position.y = ground.height;
            self.body.ground_normal = ground.normal;
            self.body.velocity.y = 0.0;
            return;
        }

        // Walked off an edge
        let from = self.body.mode;
        if !self.set_mode(MovementMode::Airborne) {
            return;
        }
        match from {
            MovementMode::Crouching => events.push(MovementEvent::CrouchEnd),
            MovementMode::Sliding => {
                self.timers.slide_cooldown = self.config.slide_cooldown;
                events.push(MovementEvent::SlideEnd);
            }
            _ => {}
        }
        self.body.ground_normal = Vec3::Y;
        self.timers.coyote = self.config.coyote_time;
        self.timers.jump_buffer = 0.0;
    }

    fn try_attach_wall(&mut self, probe: &CollisionProbe<'_>, events: &mut Vec<MovementEvent>) {
        let Some(wall) = probe.wall(
            self.body.center(),
            self.config.wall_probe_rays,
            self.config.radius + self.config.wall_probe_distance,
            self.config.wall_normal_max_y,
        ) else {
            return;
        };

        if !wall_run::can_attach(&self.body, &self.timers, &self.config, &wall) {
            return;
        }

        // Standing next to a wall is not a wall-run
        if self.ground_below(probe, self.config.ground_snap_distance) {
            return;
        }

        if self.set_mode(MovementMode::WallRunning) {
            wall_run::attach(&mut self.body, &mut self.timers, &self.config, &wall);
            events.push(MovementEvent::WallRunStart {
                normal: self.body.wall_normal,
            });
        }
    }

    fn check_wall(&mut self, probe: &CollisionProbe<'_>, events: &mut Vec<MovementEvent>) {
        if self.ground_below(probe, self.config.ground_probe_distance) {
            self.leave_wall(events);
            return;
        }

        let wall = probe.wall_in_direction(
            self.body.center(),
            -self.body.wall_normal,
            self.config.radius + self.config.wall_probe_distance,
            self.config.wall_normal_max_y,
        );
        match wall {
            Some(wall) => self.body.wall_normal = wall_run::flat_normal(wall.normal),
            None => self.leave_wall(events),
        }
    }

    fn ground_below(&self, probe: &CollisionProbe<'_>, distance: f32) -> bool {
        let step = self.config.step_height;
        probe
            .ground(
                self.body.position + Vec3::Y * step,
                self.config.radius,
                self.config.ground_sample_rings,
                step + distance,
            )
            .is_some()
    }
}

/// Clamp a frame time into `[0, max]`; non-finite input becomes zero.
fn clamp_delta(delta_time: f32, max: f32) -> f32 {
    if delta_time.is_finite() {
        delta_time.clamp(0.0, max)
    } else {
        0.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Obstacle, ObstacleTags};
    use glam::Quat;

    const DT: f32 = 1.0 / 60.0;

    fn create_test_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();

        // Floor at y=0
        world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0));

        world
    }

    fn grounded_controller() -> MovementController {
        MovementController::new(MovementConfig::default(), Vec3::ZERO)
    }

    fn airborne_at(position: Vec3, velocity: Vec3) -> MovementController {
        let mut controller = MovementController::new(MovementConfig::default(), position);
        controller.body.mode = MovementMode::Airborne;
        controller.body.velocity = velocity;
        controller
    }

    fn run(
        controller: &mut MovementController,
        world: &CollisionWorld,
        input: &MovementInput,
        ticks: usize,
    ) -> Vec<MovementEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            controller.update(world, input, DT, &mut events);
        }
        events
    }

    fn count(events: &[MovementEvent], wanted: MovementEvent) -> usize {
        events
            .iter()
            .filter(|e| std::mem::discriminant(*e) == std::mem::discriminant(&wanted))
            .count()
    }

    // ========================================================================
    // Timing
    // ========================================================================

    #[test]
    fn test_delta_time_clamped() {
        let world = CollisionWorld::new();
        let mut controller = airborne_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        let mut events = Vec::new();

        let used = controller.update(&world, &MovementInput::default(), 0.5, &mut events);
        assert_eq!(used, 0.1);
        assert!((controller.body.velocity.y + 0.1 * controller.config.gravity).abs() < 1e-4);

        assert_eq!(controller.update(&world, &MovementInput::default(), -1.0, &mut events), 0.0);
        assert_eq!(controller.update(&world, &MovementInput::default(), f32::NAN, &mut events), 0.0);
    }

    #[test]
    fn test_empty_world_falls_at_terminal_velocity() {
        let world = CollisionWorld::new();
        let mut controller = grounded_controller();

        run(&mut controller, &world, &MovementInput::default(), 300);
        assert_eq!(controller.mode(), MovementMode::Airborne);
        assert!((controller.body.velocity.y + controller.config.terminal_velocity).abs() < 1e-3);
    }

    // ========================================================================
    // Walking
    // ========================================================================

    #[test]
    fn test_walk_forward() {
        let world = create_test_world();
        let mut controller = grounded_controller();

        run(&mut controller, &world, &MovementInput::forward(0.0), 60);

        assert!(controller.body.position.z > 3.0, "z={}", controller.body.position.z);
        assert!(controller.body.position.y.abs() < 1e-4);
        assert_eq!(controller.mode(), MovementMode::Grounded);
        assert!(controller.body.horizontal_speed() <= controller.config.walk_speed + 1e-3);
    }

    #[test]
    fn test_sprint_events_fire_once() {
        let world = create_test_world();
        let mut controller = grounded_controller();

        let sprint = MovementInput::forward(0.0).holding(ActionSet::SPRINT);
        let events = run(&mut controller, &world, &sprint, 30);
        assert_eq!(count(&events, MovementEvent::SprintStart), 1);
        assert_eq!(count(&events, MovementEvent::SprintEnd), 0);
        assert!(controller.body.sprinting);

        let events = run(&mut controller, &world, &MovementInput::forward(0.0), 5);
        assert_eq!(count(&events, MovementEvent::SprintEnd), 1);
        assert_eq!(count(&events, MovementEvent::SprintStart), 0);
    }

    #[test]
    fn test_wall_blocks_horizontal_motion() {
        let mut world = create_test_world();
        world.add_box(Vec3::new(0.0, 2.0, 5.5), Vec3::new(5.0, 2.0, 0.5));
        let mut controller = grounded_controller();

        run(&mut controller, &world, &MovementInput::forward(0.0), 120);

        let max_z = 5.0 - controller.config.radius;
        assert!(controller.body.position.z <= max_z + 1e-3, "z={}", controller.body.position.z);
        assert!(controller.body.position.z > max_z - 0.2);
    }

    #[test]
    fn test_step_over_low_lip() {
        let mut world = create_test_world();
        world.add_box(Vec3::new(0.0, 0.1, 10.0), Vec3::new(5.0, 0.1, 5.0));
        let mut controller = grounded_controller();
        controller.body.position.z = 3.0;

        run(&mut controller, &world, &MovementInput::forward(0.0), 90);

        assert!(controller.body.position.z > 6.0);
        assert!((controller.body.position.y - 0.2).abs() < 1e-3);
        assert_eq!(controller.mode(), MovementMode::Grounded);
    }

    #[test]
    fn test_walk_up_ramp() {
        let mut world = create_test_world();
        world.add_obstacle(Obstacle::cuboid(
            1,
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(3.0, 0.25, 6.0),
            Quat::from_rotation_x(-0.25),
            ObstacleTags::NONE,
        ));
        let mut controller = grounded_controller();
        controller.body.position.z = 2.0;

        run(&mut controller, &world, &MovementInput::forward(0.0), 90);

        assert!(controller.body.position.y > 0.5, "y={}", controller.body.position.y);
        assert!(controller.body.ground_normal.y < 0.999);
    }

    // ========================================================================
    // Jumping
    // ========================================================================

    #[test]
    fn test_jump_from_rest() {
        let world = create_test_world();
        let mut controller = grounded_controller();
        let mut events = Vec::new();

        let input = MovementInput::default().pressing(ActionSet::JUMP);
        controller.update(&world, &input, DT, &mut events);

        assert_eq!(controller.body.velocity.y, controller.config.jump_force);
        assert_eq!(controller.mode(), MovementMode::Airborne);
        assert_eq!(events, vec![MovementEvent::Jump]);
        assert_eq!(controller.timers.jump_cooldown, controller.config.jump_cooldown);
    }

    #[test]
    fn test_jump_lands_again() {
        let world = create_test_world();
        let mut controller = grounded_controller();
        let mut events = Vec::new();

        let jump = MovementInput::default().pressing(ActionSet::JUMP);
        controller.update(&world, &jump, DT, &mut events);
        events.extend(run(&mut controller, &world, &MovementInput::default(), 120));

        assert_eq!(controller.mode(), MovementMode::Grounded);
        assert!(controller.body.position.y.abs() < 1e-4);
        assert_eq!(count(&events, MovementEvent::Jump), 1);
        assert_eq!(count(&events, MovementEvent::Land { impact: 0.0 }), 1);
    }

    #[test]
    fn test_ceiling_stops_jump() {
        let mut world = create_test_world();
        world.add_box(Vec3::new(0.0, 2.75, 0.0), Vec3::new(5.0, 0.25, 5.0));
        let mut controller = grounded_controller();

        let jump = MovementInput::default().pressing(ActionSet::JUMP);
        let mut events = Vec::new();
        controller.update(&world, &jump, DT, &mut events);
        run(&mut controller, &world, &MovementInput::default(), 10);

        let head = controller.body.position.y + controller.body.height;
        assert!(head <= 2.5 + 1e-3, "head={head}");
    }

    #[test]
    fn test_coyote_jump() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(2.0, 0.5, 2.0));
        let mut controller = grounded_controller();
        controller.body.position.z = 2.3;
        controller.body.velocity.z = 7.0;

        let mut events = Vec::new();
        let forward = MovementInput::forward(0.0);
        while controller.mode() == MovementMode::Grounded {
            controller.update(&world, &forward, DT, &mut events);
        }
        assert_eq!(controller.mode(), MovementMode::Airborne);
        assert_eq!(controller.timers.coyote, controller.config.coyote_time);

        events.clear();
        controller.update(&world, &forward.pressing(ActionSet::JUMP), DT, &mut events);
        assert_eq!(events, vec![MovementEvent::Jump]);
        assert_eq!(controller.body.velocity.y, controller.config.jump_force);
        assert_eq!(controller.timers.coyote, 0.0);
    }

    #[test]
    fn test_coyote_expires() {
        let world = CollisionWorld::new();
        let mut controller = grounded_controller();

        // First tick walks off into empty space
        run(&mut controller, &world, &MovementInput::default(), 1);
        assert!(controller.timers.coyote > 0.0);

        let ticks = (controller.config.coyote_time / DT).ceil() as usize + 1;
        run(&mut controller, &world, &MovementInput::default(), ticks);

        let mut events = Vec::new();
        let jump = MovementInput::default().pressing(ActionSet::JUMP);
        controller.update(&world, &jump, DT, &mut events);
        assert!(events.is_empty());
        assert!(controller.body.velocity.y < 0.0);
    }

    #[test]
    fn test_jump_buffered_before_landing() {
        let world = create_test_world();
        let mut controller = airborne_at(Vec3::new(0.0, 0.1, 0.0), Vec3::ZERO);

        let mut events = Vec::new();
        let jump = MovementInput::default().pressing(ActionSet::JUMP);
        controller.update(&world, &jump, DT, &mut events);
        assert!(events.is_empty(), "still in the air");

        let mut landed_and_jumped = false;
        for _ in 0..20 {
            events.clear();
            controller.update(&world, &MovementInput::default(), DT, &mut events);
            if !events.is_empty() {
                assert!(matches!(events[0], MovementEvent::Land { .. }));
                assert_eq!(events[1], MovementEvent::Jump);
                landed_and_jumped = true;
                break;
            }
        }

        assert!(landed_and_jumped);
        assert_eq!(controller.mode(), MovementMode::Airborne);
        assert_eq!(controller.body.velocity.y, controller.config.jump_force);
    }

    #[test]
    fn test_bounce_pad_launches() {
        let mut world = CollisionWorld::new();
        world.add_obstacle(Obstacle::cuboid(
            9,
            Vec3::new(0.0, -0.25, 0.0),
            Vec3::new(2.0, 0.25, 2.0),
            Quat::IDENTITY,
            ObstacleTags::bouncy(18.0),
        ));
        let mut controller = airborne_at(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO);

        let mut events = Vec::new();
        for _ in 0..60 {
            controller.update(&world, &MovementInput::default(), DT, &mut events);
            if !events.is_empty() {
                break;
            }
        }

        assert_eq!(events, vec![MovementEvent::Bounce { force: 18.0 }]);
        assert_eq!(controller.mode(), MovementMode::Airborne);
        assert_eq!(controller.body.velocity.y, 18.0);
    }

    // ========================================================================
    // Crouching and Sliding
    // ========================================================================

    #[test]
    fn test_crouch_toggle() {
        let world = create_test_world();
        let mut controller = grounded_controller();
        let crouch = MovementInput::default().pressing(ActionSet::CROUCH);

        let events = run(&mut controller, &world, &crouch, 1);
        assert_eq!(events, vec![MovementEvent::CrouchStart]);
        assert_eq!(controller.mode(), MovementMode::Crouching);
        assert_eq!(controller.body.height, controller.config.crouch_height);

        let events = run(&mut controller, &world, &crouch, 1);
        assert_eq!(events, vec![MovementEvent::CrouchEnd]);
        assert_eq!(controller.mode(), MovementMode::Grounded);
        assert_eq!(controller.body.height, controller.config.standing_height);
    }

    #[test]
    fn test_crouch_blocked_under_ceiling() {
        let mut world = create_test_world();
        world.add_box(Vec3::new(0.0, 1.5, 0.0), Vec3::new(3.0, 0.25, 3.0));
        let mut controller = grounded_controller();
        controller.body.mode = MovementMode::Crouching;
        controller.body.height = controller.config.crouch_height;

        let crouch = MovementInput::default().pressing(ActionSet::CROUCH);
        let events = run(&mut controller, &world, &crouch, 1);

        assert!(events.is_empty());
        assert_eq!(controller.mode(), MovementMode::Crouching);
        assert_eq!(controller.body.height, controller.config.crouch_height);
    }

    #[test]
    fn test_crouch_rejected_in_air() {
        let world = CollisionWorld::new();
        let mut controller = airborne_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        let crouch = MovementInput::default().pressing(ActionSet::CROUCH);

        let events = run(&mut controller, &world, &crouch, 1);
        assert!(events.is_empty());
        assert_eq!(controller.mode(), MovementMode::Airborne);
    }

    #[test]
    fn test_slide_after_sprint_ends_crouched() {
        let world = create_test_world();
        let mut controller = grounded_controller();

        let sprint = MovementInput::forward(0.0).holding(ActionSet::SPRINT);
        run(&mut controller, &world, &sprint, 40);

        let events = run(&mut controller, &world, &sprint.pressing(ActionSet::CROUCH), 1);
        assert_eq!(controller.mode(), MovementMode::Sliding);
        assert_eq!(count(&events, MovementEvent::SlideStart), 1);
        assert!(controller.body.slide_speed >= controller.config.slide_speed);
        assert_eq!(controller.body.height, controller.config.slide_height);

        let mut events = Vec::new();
        let mut previous = controller.mode();
        for _ in 0..200 {
            controller.update(&world, &MovementInput::forward(0.0), DT, &mut events);
            if previous == MovementMode::Sliding {
                assert_ne!(controller.mode(), MovementMode::Grounded);
            }
            previous = controller.mode();
            if previous != MovementMode::Sliding {
                break;
            }
        }

        assert_eq!(controller.mode(), MovementMode::Crouching);
        assert_eq!(count(&events, MovementEvent::SlideEnd), 1);
        assert!(controller.timers.slide_cooldown > 0.0);
    }

    #[test]
    fn test_sprint_while_crouched_slides() {
        let world = create_test_world();
        let mut controller = grounded_controller();
        run(&mut controller, &world, &MovementInput::default().pressing(ActionSet::CROUCH), 1);
        assert_eq!(controller.mode(), MovementMode::Crouching);

        let sprint = MovementInput::forward(0.0).holding(ActionSet::SPRINT);
        let events = run(&mut controller, &world, &sprint, 30);
        assert!(controller.timers.sprint_duration >= controller.config.min_sprint_for_slide);
        assert!(!controller.body.sprinting);
        assert_eq!(count(&events, MovementEvent::SprintStart), 0);

        let events = run(&mut controller, &world, &sprint.pressing(ActionSet::CROUCH), 1);
        assert_eq!(controller.mode(), MovementMode::Sliding);
        assert_eq!(&events[..2], &[MovementEvent::CrouchEnd, MovementEvent::SlideStart]);
        assert!(controller.body.slide_speed >= controller.config.slide_speed);
    }

    #[test]
    fn test_crouch_without_sprint_does_not_slide() {
        let world = create_test_world();
        let mut controller = grounded_controller();

        run(&mut controller, &world, &MovementInput::forward(0.0), 40);
        run(&mut controller, &world, &MovementInput::forward(0.0).pressing(ActionSet::CROUCH), 1);
        assert_eq!(controller.mode(), MovementMode::Crouching);
    }

    #[test]
    fn test_slide_jump_cancels_slide() {
        let world = create_test_world();
        let mut controller = grounded_controller();

        let sprint = MovementInput::forward(0.0).holding(ActionSet::SPRINT);
        run(&mut controller, &world, &sprint, 40);
        run(&mut controller, &world, &sprint.pressing(ActionSet::CROUCH), 1);
        assert_eq!(controller.mode(), MovementMode::Sliding);

        let events = run(&mut controller, &world, &MovementInput::forward(0.0).pressing(ActionSet::JUMP), 1);
        assert_eq!(events, vec![MovementEvent::SlideEnd, MovementEvent::Jump]);
        assert_eq!(controller.mode(), MovementMode::Airborne);
    }

    // ========================================================================
    // Wall Running
    // ========================================================================

    fn wall_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        // Wall face at x=-1 spanning z in [0, 30]
        world.add_box(Vec3::new(-1.5, 3.0, 15.0), Vec3::new(0.5, 3.0, 15.0));
        world
    }

    #[test]
    fn test_wall_run_attach_and_time_limit() {
        let world = wall_world();
        let mut controller = airborne_at(Vec3::new(-0.5, 2.0, 2.0), Vec3::new(0.0, -1.0, 10.0));
        let input = MovementInput::forward(0.0);

        let events = run(&mut controller, &world, &input, 1);
        assert_eq!(controller.mode(), MovementMode::WallRunning);
        assert!(matches!(events[..], [MovementEvent::WallRunStart { normal }] if normal.x > 0.99));

        let max = controller.config.wall_run_max_time;
        let mut events = Vec::new();
        let mut ticks = 0;
        while controller.mode() == MovementMode::WallRunning {
            controller.update(&world, &input, DT, &mut events);
            assert!(controller.timers.wall_run_elapsed <= max);
            ticks += 1;
            assert!(ticks < 200);
        }

        assert_eq!(controller.mode(), MovementMode::Airborne);
        assert_eq!(controller.timers.wall_run_elapsed, max);
        assert_eq!(count(&events, MovementEvent::WallRunEnd), 1);
        assert!(controller.timers.wall_run_cooldown > 0.0);
    }

    #[test]
    fn test_wall_jump_pushes_away() {
        let world = wall_world();
        let mut controller = airborne_at(Vec3::new(-0.5, 2.0, 2.0), Vec3::new(0.0, -1.0, 10.0));
        let input = MovementInput::forward(0.0);
        run(&mut controller, &world, &input, 5);
        assert_eq!(controller.mode(), MovementMode::WallRunning);

        let events = run(&mut controller, &world, &input.pressing(ActionSet::JUMP), 1);
        assert_eq!(
            events,
            vec![MovementEvent::WallRunEnd, MovementEvent::WallJump, MovementEvent::Jump]
        );
        assert_eq!(controller.mode(), MovementMode::Airborne);
        assert!(controller.body.velocity.x > 0.0);
        assert!((controller.body.velocity.y - 0.9 * controller.config.jump_force).abs() < 1e-4);
    }

    #[test]
    fn test_slow_body_does_not_attach() {
        let world = wall_world();
        let mut controller = airborne_at(Vec3::new(-0.5, 2.0, 2.0), Vec3::new(0.0, -1.0, 2.0));
        run(&mut controller, &world, &MovementInput::default(), 1);
        assert_eq!(controller.mode(), MovementMode::Airborne);
    }

    // ========================================================================
    // External Control
    // ========================================================================

    #[test]
    fn test_invalid_request_rejected() {
        let world = create_test_world();
        let mut controller = grounded_controller();
        let mut events = Vec::new();

        assert!(!controller.request_mode(&world, MovementMode::WallRunning, &mut events));
        assert!(!controller.request_mode(&world, MovementMode::Airborne, &mut events));
        assert!(controller.request_mode(&world, MovementMode::Sliding, &mut events));
        assert!(!controller.request_mode(&world, MovementMode::Grounded, &mut events));
        assert_eq!(controller.mode(), MovementMode::Sliding);
        assert_eq!(events, vec![MovementEvent::SlideStart]);
    }

    #[test]
    fn test_requested_crouch_pairs_events() {
        let world = create_test_world();
        let mut controller = grounded_controller();
        let mut events = Vec::new();

        assert!(controller.request_mode(&world, MovementMode::Crouching, &mut events));
        assert_eq!(controller.body.height, controller.config.crouch_height);
        events.extend(run(
            &mut controller,
            &world,
            &MovementInput::default().pressing(ActionSet::CROUCH),
            1,
        ));

        assert_eq!(events, vec![MovementEvent::CrouchStart, MovementEvent::CrouchEnd]);
        assert_eq!(controller.mode(), MovementMode::Grounded);
    }

    #[test]
    fn test_requested_slide_runs_like_input() {
        let world = create_test_world();
        let mut controller = grounded_controller();
        let mut events = Vec::new();

        assert!(controller.request_mode(&world, MovementMode::Sliding, &mut events));
        assert_eq!(events, vec![MovementEvent::SlideStart]);
        assert!((controller.body.slide_direction - controller.body.forward()).length() < 1e-6);
        assert!(controller.body.slide_speed >= controller.config.slide_speed);
        assert_eq!(controller.timers.slide_elapsed, 0.0);

        events.extend(run(&mut controller, &world, &MovementInput::default(), 300));
        assert_eq!(controller.mode(), MovementMode::Crouching);
        assert_eq!(
            events,
            vec![
                MovementEvent::SlideStart,
                MovementEvent::SlideEnd,
                MovementEvent::CrouchStart
            ]
        );

        events.clear();
        assert!(controller.request_mode(&world, MovementMode::Grounded, &mut events));
        assert_eq!(events, vec![MovementEvent::CrouchEnd]);
    }

    #[test]
    fn test_requested_stand_blocked_under_ceiling() {
        let mut world = create_test_world();
        world.add_box(Vec3::new(0.0, 1.5, 0.0), Vec3::new(3.0, 0.25, 3.0));
        let mut controller = grounded_controller();
        let mut events = Vec::new();

        assert!(controller.request_mode(&world, MovementMode::Crouching, &mut events));
        assert!(!controller.request_mode(&world, MovementMode::Grounded, &mut events));
        assert_eq!(controller.mode(), MovementMode::Crouching);
        assert_eq!(events, vec![MovementEvent::CrouchStart]);
    }

    #[test]
    fn test_respawn_resets_body() {
        let mut controller = airborne_at(Vec3::new(3.0, -20.0, 7.0), Vec3::new(4.0, -30.0, 2.0));
        controller.body.sprinting = true;
        controller.timers.coyote = 0.1;

        let mut events = Vec::new();
        controller.respawn(Vec3::new(0.0, 0.8, 20.0), &mut events);

        assert_eq!(controller.body.position, Vec3::new(0.0, 0.8, 20.0));
        assert_eq!(controller.body.velocity, Vec3::ZERO);
        assert_eq!(controller.mode(), MovementMode::Grounded);
        assert_eq!(controller.timers, Timers::default());
        assert_eq!(events, vec![MovementEvent::SprintEnd]);
    }
}
