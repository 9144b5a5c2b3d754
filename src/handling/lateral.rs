// ==============================================================================
// lateral.rs — LATERAL SLIP CORRECTION (grip cap + drift regime)
// ------------------------------------------------------------------------------
// Model steps:
// 1) deadzone for tiny lateral speed
// 2) desired correction ~ -v_lat * tire_stiffness (kills slip when applied)
// 3) grip cap from the normal-load estimate:
//       load = g + downforce * v_fwd^2 / mass        (per unit mass)
//       cap  = grip * load
// 4) drift input, or demand beyond the cap, switches to the drifting regime
//    (reduced correction, hysteresis on recovery)
//
// Everything is expressed per unit mass (accelerations), so the caller adds
// `accel * dt` straight onto the lateral speed component.
// ==============================================================================

use crate::handling::state::{GripState, update_grip_state};
use crate::tuning::VehicleConfig;

/// Lateral speeds below this are treated as no slip (m/s).
pub const SLIP_DEADZONE: f32 = 0.01;

pub struct LateralResolution {
    pub accel: f32, // m/s^2 along the wheel side axis
    pub state: GripState,
}

pub fn solve_lateral(
    cfg: &VehicleConfig,
    lateral_speed: f32,
    forward_speed: f32,
    drift_input: bool,
    prev: GripState,
) -> LateralResolution {
    if lateral_speed.abs() < SLIP_DEADZONE {
        let state = update_grip_state(prev, 0.0, 1.0, drift_input);
        return LateralResolution { accel: 0.0, state };
    }

    let desired = -lateral_speed * cfg.tire_stiffness;

    // Normal-load estimate: base weight plus speed-squared downforce.
    let load = cfg.gravity + cfg.downforce * forward_speed * forward_speed / cfg.mass.max(1.0);
    let cap = (cfg.grip * load).max(1e-3);

    let state = update_grip_state(prev, desired.abs(), cap, drift_input);

    let mut accel = desired.clamp(-cap, cap);
    if state == GripState::Drift {
        accel *= cfg.drift_grip;
    }

    LateralResolution { accel, state }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::ROADSTER;

    #[test]
    fn small_slip_is_fully_corrected() {
        let r = solve_lateral(&ROADSTER, 0.5, 20.0, false, GripState::Grip);
        assert_eq!(r.state, GripState::Grip);
        assert!((r.accel + 0.5 * ROADSTER.tire_stiffness).abs() < 1e-4);
    }

    #[test]
    fn correction_opposes_slip_direction() {
        let right = solve_lateral(&ROADSTER, 1.0, 20.0, false, GripState::Grip);
        let left = solve_lateral(&ROADSTER, -1.0, 20.0, false, GripState::Grip);
        assert!(right.accel < 0.0);
        assert!(left.accel > 0.0);
    }

    #[test]
    fn saturation_drifts_and_reduces_correction() {
        // Huge slip at low speed: demand far beyond the cap.
        let r = solve_lateral(&ROADSTER, 30.0, 5.0, false, GripState::Grip);
        assert_eq!(r.state, GripState::Drift);
        let load = ROADSTER.gravity + ROADSTER.downforce * 25.0 / ROADSTER.mass;
        let cap = ROADSTER.grip * load;
        assert!((r.accel + cap * ROADSTER.drift_grip).abs() < 1e-3);
    }

    #[test]
    fn drift_input_forces_reduced_grip() {
        let normal = solve_lateral(&ROADSTER, 1.0, 20.0, false, GripState::Grip);
        let drifting = solve_lateral(&ROADSTER, 1.0, 20.0, true, GripState::Grip);
        assert_eq!(drifting.state, GripState::Drift);
        assert!(drifting.accel.abs() < normal.accel.abs());
    }

    #[test]
    fn downforce_raises_the_cap_with_speed() {
        let slow = solve_lateral(&ROADSTER, 50.0, 5.0, false, GripState::Grip);
        let fast = solve_lateral(&ROADSTER, 50.0, 80.0, false, GripState::Grip);
        // Both saturate, but the fast cap is higher.
        assert!(fast.accel.abs() > slow.accel.abs());
    }
}
