// ==============================================================================
// suspension.rs — RAYCAST SUSPENSION MEASUREMENT + SPRING/DAMPER FORCE
// ------------------------------------------------------------------------------
// This module measures; it does not move the vehicle. The integrator casts a
// ray per wheel, turns the hit into a SuspensionSample, and converts the
// sample into a velocity change along the contact normal.
//
// Force model per grounded wheel:
//   spring = stiffness * compression                    (Hooke)
//   damper = -damping * v_n, clamped to a fraction of the spring so rebound
//            cannot exceed support
//   force  = max(spring + damper, 0), capped
// ==============================================================================

use crate::query::{RayHit, SpatialQuery};
use crate::types::Vec3;

/// Cast slack beyond the rest length so a wheel just past full extension is
/// still observed (and the ground normal retained) instead of vanishing.
pub const RAY_RANGE_FACTOR: f32 = 1.25;

/// Suspension velocity deadzone to kill micro jitter (m/s).
pub const SUSPENSION_VEL_DEADZONE: f32 = 0.05;

/// Damper clamp as a fraction of the spring force.
pub const DAMPER_CLAMP_FRACTION: f32 = 0.6;

/// Hard cap on per-wheel normal force (N).
pub const MAX_WHEEL_FORCE: f32 = 25_000.0;

/// Per-wheel ground contact, recomputed every tick and never persisted.
#[derive(Clone, Copy, Debug)]
pub struct SuspensionSample {
    pub grounded: bool,
    pub distance: f32, // ray hit distance from the mount (meters)
    pub normal: Vec3,  // surface normal at the hit
}

impl SuspensionSample {
    pub fn airborne() -> Self {
        Self {
            grounded: false,
            distance: f32::INFINITY,
            normal: Vec3::y(),
        }
    }
}

/// Cast one wheel ray. `grounded` is true only when the hit lies within the
/// rest length.
pub fn sample_wheel(
    query: &SpatialQuery,
    mount: Vec3,
    down: Vec3,
    rest_length: f32,
) -> SuspensionSample {
    match query.raycast(mount, down, rest_length * RAY_RANGE_FACTOR) {
        Some(RayHit {
            normal, distance, ..
        }) => SuspensionSample {
            grounded: distance <= rest_length,
            distance,
            normal,
        },
        None => SuspensionSample::airborne(),
    }
}

/// Spring + damper force along the contact normal (N, never negative).
pub fn suspension_force(compression: f32, suspension_vel: f32, stiffness: f32, damping: f32) -> f32 {
    // Deadzone
    let v = if suspension_vel.abs() < SUSPENSION_VEL_DEADZONE {
        0.0
    } else {
        suspension_vel
    };

    let spring = stiffness * compression;
    let damper = (-damping * v).clamp(
        -spring * DAMPER_CLAMP_FRACTION,
        spring * DAMPER_CLAMP_FRACTION,
    );

    (spring + damper).max(0.0).min(MAX_WHEEL_FORCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_is_zero_without_compression() {
        assert_eq!(suspension_force(0.0, 0.0, 59_000.0, 7_500.0), 0.0);
    }

    #[test]
    fn compression_yields_hooke_spring() {
        let f = suspension_force(0.05, 0.0, 59_000.0, 7_500.0);
        assert!((f - 2950.0).abs() < 1e-2);
    }

    #[test]
    fn damper_is_clamped_relative_to_spring() {
        // Massive downward velocity cannot exceed spring * (1 + fraction).
        let f = suspension_force(0.05, -100.0, 59_000.0, 7_500.0);
        let spring = 59_000.0 * 0.05;
        assert!(f <= spring * (1.0 + DAMPER_CLAMP_FRACTION) + 1e-3);
        // Massive upward velocity cannot drive the force negative.
        let f = suspension_force(0.05, 100.0, 59_000.0, 7_500.0);
        assert!(f >= 0.0);
    }

    #[test]
    fn force_caps_at_max() {
        let f = suspension_force(10.0, 0.0, 1.0e6, 0.0);
        assert_eq!(f, MAX_WHEEL_FORCE);
    }
}
