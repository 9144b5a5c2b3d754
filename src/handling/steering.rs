// ==============================================================================
// steering.rs — SPEED-SENSITIVE STEERING + KINEMATIC BICYCLE YAW
// ------------------------------------------------------------------------------
// - The steering target shrinks with forward speed so the vehicle is not
//   twitchy near max_speed.
// - The actual steering angle approaches the target at a fixed angular rate;
//   it never snaps.
// - Yaw rate comes from the bicycle approximation:
//       yaw_rate = (forward_speed / wheelbase) * tan(steer_angle)
//   Reverse travel flips the yaw direction through the sign of forward_speed.
// ==============================================================================

use crate::tuning::VehicleConfig;

/// Lower bound on the speed-sensitive steering range (fraction of full lock).
pub const MIN_STEER_SCALE: f32 = 0.35;

/// Steering target for the current input and forward speed (radians).
pub fn steer_target(cfg: &VehicleConfig, steer_input: f32, forward_speed: f32) -> f32 {
    let speed_ratio = (forward_speed.abs() / cfg.max_speed.max(1.0)).clamp(0.0, 1.0);
    let scale = (1.0 - speed_ratio * cfg.steer_taper).clamp(MIN_STEER_SCALE, 1.0);
    steer_input * cfg.max_steer_angle * scale
}

/// Rate-limit the steering angle toward `target`.
pub fn advance_steer_angle(current: f32, target: f32, steer_speed: f32, dt: f32) -> f32 {
    let max_step = steer_speed * dt;
    current + (target - current).clamp(-max_step, max_step)
}

/// Kinematic bicycle yaw rate (rad/s). Positive steer turns right.
pub fn yaw_rate(cfg: &VehicleConfig, forward_speed: f32, steer_angle: f32) -> f32 {
    let angle = steer_angle.clamp(-cfg.max_steer_angle, cfg.max_steer_angle);
    (forward_speed / cfg.wheelbase.max(0.1)) * angle.tan()
}
