//! Barrier collision resolution.
//!
//! Orchestration glue with no state of its own: the vehicle's current
//! bounding box is tested against the barrier set, and any overlap is
//! converted into a positional correction plus a velocity reflection via
//! [`VehicleDynamics::apply_collision`].

use crate::query::SpatialQuery;
use crate::vehicle::VehicleDynamics;

/// Resolve at most one barrier overlap this tick. Returns true when a
/// collision was applied.
pub fn resolve_barriers(vehicle: &mut VehicleDynamics, query: &SpatialQuery) -> bool {
    let Some(hit) = query.barrier_overlap(vehicle.bounds()) else {
        return false;
    };
    vehicle.apply_collision(hit.push, hit.depth);
    true
}
