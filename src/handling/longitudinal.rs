// ==============================================================================
// longitudinal.rs — THROTTLE / BRAKE / ROLLING RESISTANCE (scalar model)
// ------------------------------------------------------------------------------
// Operates on the signed forward speed only (positive = forward). The caller
// decomposes world velocity onto the wheel basis and reassembles it after.
//
// - Throttle accelerates toward max_speed and never pushes past it.
// - Speed above max_speed (boost overshoot) is not clipped; it bleeds off
//   through the same exponential decay as coasting.
// - Brake decelerates through zero into reverse, capped at reverse_max_speed.
// - With no pedal input, speed decays exponentially and snaps to zero inside
//   a small deadzone so the vehicle never creeps or flips sign on its own.
// ==============================================================================

use crate::tuning::VehicleConfig;

/// Below this speed a coasting or braking vehicle is considered stopped (m/s).
pub const STOP_DEADZONE: f32 = 0.05;

pub fn advance_forward_speed(
    cfg: &VehicleConfig,
    throttle: f32,
    brake: f32,
    forward_speed: f32,
    dt: f32,
) -> f32 {
    let mut speed = forward_speed;

    if throttle > 0.0 && speed < cfg.max_speed {
        speed = (speed + cfg.acceleration * throttle * dt).min(cfg.max_speed);
    }

    if brake > 0.0 {
        speed -= cfg.brake_deceleration * brake * dt;
        speed = speed.max(-cfg.reverse_max_speed);

        // Braking through zero is intentional (reverse), but a light brake at
        // crawl speed should stop cleanly rather than oscillate.
        if forward_speed > 0.0 && speed < 0.0 && brake < 0.5 {
            speed = 0.0;
        }
    }

    if throttle <= 0.0 && brake <= 0.0 {
        speed *= (-cfg.rolling_resistance * dt).exp();
        if speed.abs() < STOP_DEADZONE {
            speed = 0.0;
        }
    }

    // Overshoot (boost) bleeds back toward max_speed instead of being clipped.
    if speed > cfg.max_speed {
        let excess = speed - cfg.max_speed;
        speed = cfg.max_speed + excess * (-cfg.rolling_resistance * dt).exp();
    }

    speed
}
