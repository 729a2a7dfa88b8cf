//! Momentum sliding.
//!
//! A slide ignores movement input. It keeps the direction captured when it
//! started, loses speed to exponential friction and gains or loses speed on
//! slopes from the component of gravity along the ground.

use glam::Vec3;

use super::config::MovementConfig;
use super::state::{KinematicBody, Timers};

/// Speed a slide starts with given the current horizontal speed.
pub(super) fn start_speed(current: f32, config: &MovementConfig) -> f32 {
    current.max(config.slide_speed) + config.slide_boost
}

/// Acceleration along `direction` caused by gravity on a surface with `normal`.
///
/// Positive when `direction` points downhill.
pub(super) fn slope_acceleration(normal: Vec3, direction: Vec3, gravity: f32) -> f32 {
    // Gravity projected onto the surface plane
    let along_surface = Vec3::NEG_Y - normal * normal.dot(Vec3::NEG_Y);
    let downhill = Vec3::new(along_surface.x, 0.0, along_surface.z);
    downhill.dot(direction) * gravity
}

/// Advance the slide by `dt`.
///
/// Returns `false` once the slide is over: speed fell below
/// `slide_min_speed` or it lasted `slide_max_time`.
pub(super) fn advance(
    body: &mut KinematicBody,
    timers: &mut Timers,
    config: &MovementConfig,
    dt: f32,
) -> bool {
    timers.slide_elapsed += dt;

    let mut speed = body.slide_speed * (-config.slide_friction * dt).exp();
    speed += slope_acceleration(body.ground_normal, body.slide_direction, config.gravity)
        * config.slide_slope_factor
        * dt;
    body.slide_speed = speed.max(0.0);

    body.velocity.x = body.slide_direction.x * body.slide_speed;
    body.velocity.z = body.slide_direction.z * body.slide_speed;

    body.slide_speed >= config.slide_min_speed && timers.slide_elapsed < config.slide_max_time
}

/// Re-read slide speed and direction from the velocity after collisions.
pub(super) fn sync_from_velocity(body: &mut KinematicBody) {
    let horizontal = Vec3::new(body.velocity.x, 0.0, body.velocity.z);
    body.slide_speed = horizontal.length();
    if body.slide_speed > 1e-4 {
        body.slide_direction = horizontal / body.slide_speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sliding_body(speed: f32) -> KinematicBody {
        let mut body = KinematicBody::new(Vec3::ZERO, 0.8, 0.6);
        body.slide_direction = Vec3::Z;
        body.slide_speed = speed;
        body
    }

    #[test]
    fn test_start_speed() {
        let config = MovementConfig::default();
        assert_eq!(start_speed(5.0, &config), config.slide_speed + config.slide_boost);
        assert_eq!(start_speed(20.0, &config), 20.0 + config.slide_boost);
    }

    #[test]
    fn test_flat_slide_decays() {
        let config = MovementConfig::default();
        let mut body = sliding_body(15.0);
        let mut timers = Timers::default();

        assert!(advance(&mut body, &mut timers, &config, 0.1));
        assert!(body.slide_speed < 15.0);
        assert!((body.velocity.z - body.slide_speed).abs() < 1e-5);
    }

    #[test]
    fn test_slide_ends_below_min_speed() {
        let config = MovementConfig::default();
        let mut body = sliding_body(config.slide_min_speed + 0.01);
        let mut timers = Timers::default();

        assert!(!advance(&mut body, &mut timers, &config, 0.1));
    }

    #[test]
    fn test_slide_ends_at_max_time() {
        let config = MovementConfig {
            slide_friction: 0.0,
            ..Default::default()
        };
        let mut body = sliding_body(15.0);
        let mut timers = Timers {
            slide_elapsed: config.slide_max_time - 0.05,
            ..Default::default()
        };

        assert!(!advance(&mut body, &mut timers, &config, 0.1));
    }

    #[test]
    fn test_slope_acceleration_sign() {
        // Surface rising toward +Z: normal tilts toward -Z
        let angle = 0.3_f32;
        let normal = Vec3::new(0.0, angle.cos(), -angle.sin());

        let downhill = slope_acceleration(normal, Vec3::NEG_Z, 24.0);
        let uphill = slope_acceleration(normal, Vec3::Z, 24.0);
        assert!(downhill > 0.0);
        assert!((downhill + uphill).abs() < 1e-5);
        assert!((downhill - 24.0 * angle.sin() * angle.cos()).abs() < 1e-4);

        assert!(slope_acceleration(Vec3::Y, Vec3::Z, 24.0).abs() < 1e-6);
    }
}
