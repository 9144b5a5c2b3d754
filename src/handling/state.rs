//! Grip regime with hysteresis.
//!
//! Two regimes: full static grip, and a drifting (kinetic) regime entered on
//! explicit drift input or when lateral demand exceeds the grip cap. Recovery
//! requires demand to fall well below the cap so the state does not chatter
//! at the boundary.

/// Fraction of the grip cap the lateral demand must drop below before a
/// drifting tire recovers static grip.
pub const DRIFT_RECOVER_FRACTION: f32 = 0.8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GripState {
    Grip,
    Drift,
}

pub fn update_grip_state(prev: GripState, demand: f32, cap: f32, drift_input: bool) -> GripState {
    if drift_input {
        return GripState::Drift;
    }

    // Saturated lateral demand
    if demand > cap {
        return GripState::Drift;
    }

    // Recover logic
    match prev {
        GripState::Drift => {
            if demand < cap * DRIFT_RECOVER_FRACTION {
                GripState::Grip
            } else {
                GripState::Drift
            }
        }
        GripState::Grip => GripState::Grip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_input_always_drifts() {
        assert_eq!(update_grip_state(GripState::Grip, 0.0, 10.0, true), GripState::Drift);
    }

    #[test]
    fn saturation_enters_drift() {
        assert_eq!(update_grip_state(GripState::Grip, 11.0, 10.0, false), GripState::Drift);
    }

    #[test]
    fn recovery_needs_margin_below_cap() {
        // Just under the cap is not enough to recover.
        assert_eq!(update_grip_state(GripState::Drift, 9.5, 10.0, false), GripState::Drift);
        // Well under the cap recovers.
        assert_eq!(update_grip_state(GripState::Drift, 7.0, 10.0, false), GripState::Grip);
    }
}
