//! Spatial queries over registered track geometry.
//!
//! Pure queries: every function either finds something or reports absence,
//! and absence is the normal case (airborne vehicle, no barrier nearby).
//! Results are deterministic for identical geometry and rays: candidates are
//! scanned in registration order and ties resolve to the smallest distance,
//! so there is no acceleration-structure ordering to leak into physics.

use parry3d::bounding_volume::{Aabb, BoundingVolume};
use parry3d::query::{Ray, RayCast};

use crate::track::{BoostZone, CheckpointZone, OrientedBox, TrackGeometry};
use crate::types::{Iso, Point3, Vec3, safe_normalize};

/// Downward probe length for the standalone grounded test (meters).
pub const GROUND_PROBE_DISTANCE: f32 = 1.5;

/// Probe origin lift above the queried position (meters). Keeps the ray start
/// clear of the surface when the caller passes a point already on it.
pub const GROUND_PROBE_LIFT: f32 = 0.25;

/// Safety padding added to barrier penetration depth (meters). Pushes the
/// vehicle fully clear so resting contact does not re-trigger every tick.
pub const BARRIER_PUSH_PADDING: f32 = 0.1;

/// Nearest ray intersection against a registered surface.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Minimum-translation push out of a barrier.
#[derive(Clone, Copy, Debug)]
pub struct BarrierHit {
    pub push: Vec3, // unit direction
    pub depth: f32, // padded penetration depth
}

/// Stateless query set over externally-built [`TrackGeometry`].
pub struct SpatialQuery {
    track: TrackGeometry,
}

impl SpatialQuery {
    pub fn new(track: TrackGeometry) -> Self {
        Self { track }
    }

    pub fn track(&self) -> &TrackGeometry {
        &self.track
    }

    /// Swap in a new track wholesale. Callers must reset all dependent race
    /// state before the next tick.
    pub fn replace(&mut self, track: TrackGeometry) {
        self.track = track;
    }

    /// Nearest intersection among registered surfaces within `max_distance`.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        if max_distance <= 0.0 {
            return None;
        }
        let dir = direction.magnitude();
        if dir < 1e-6 {
            return None;
        }
        let dir = direction / dir;
        let ray = Ray::new(Point3::new(origin.x, origin.y, origin.z), dir);
        let identity = Iso::identity();

        let mut best: Option<RayHit> = None;
        for surface in &self.track.surfaces {
            for tri in &surface.triangles {
                let Some(hit) = tri.cast_ray_and_get_normal(&identity, &ray, max_distance, true)
                else {
                    continue;
                };
                if best
                    .as_ref()
                    .is_none_or(|b| hit.time_of_impact < b.distance)
                {
                    // Triangles are double-sided here; orient the normal
                    // against the ray so callers always see the facing side.
                    let mut normal = safe_normalize(hit.normal, -dir);
                    if normal.dot(&dir) > 0.0 {
                        normal = -normal;
                    }
                    best = Some(RayHit {
                        point: origin + dir * hit.time_of_impact,
                        normal,
                        distance: hit.time_of_impact,
                    });
                }
            }
        }
        best
    }

    /// Convenience probe: is there a surface within a fixed distance below
    /// `position`?
    pub fn is_grounded(&self, position: Vec3) -> bool {
        self.raycast(
            position + Vec3::y() * GROUND_PROBE_LIFT,
            -Vec3::y(),
            GROUND_PROBE_DISTANCE + GROUND_PROBE_LIFT,
        )
        .is_some()
    }

    /// Point-in-oriented-box test.
    pub fn intersects_zone(&self, point: Vec3, zone: &OrientedBox) -> bool {
        zone.contains(point)
    }

    /// First boost zone containing `point`, in registration order.
    pub fn boost_zone_at(&self, point: Vec3) -> Option<&BoostZone> {
        self.track.boost_zones.iter().find(|z| z.volume.contains(point))
    }

    /// First checkpoint zone containing `point`, in registration order.
    pub fn checkpoint_at(&self, point: Vec3) -> Option<&CheckpointZone> {
        self.track.checkpoints.iter().find(|c| c.volume.contains(point))
    }

    /// Overlap test against the barrier set. On overlap, returns a unit push
    /// direction along the shallower of the X/Z penetration axes and a padded
    /// depth.
    pub fn barrier_overlap(&self, bounds: &Aabb) -> Option<BarrierHit> {
        for barrier in &self.track.barriers {
            if !barrier.intersects(bounds) {
                continue;
            }
            let overlap_x =
                bounds.maxs.x.min(barrier.maxs.x) - bounds.mins.x.max(barrier.mins.x);
            let overlap_z =
                bounds.maxs.z.min(barrier.maxs.z) - bounds.mins.z.max(barrier.mins.z);
            if overlap_x <= 0.0 || overlap_z <= 0.0 {
                continue;
            }

            let center = bounds.center();
            let barrier_center = barrier.center();
            let (push, depth) = if overlap_x <= overlap_z {
                let sign = if center.x >= barrier_center.x { 1.0 } else { -1.0 };
                (Vec3::new(sign, 0.0, 0.0), overlap_x)
            } else {
                let sign = if center.z >= barrier_center.z { 1.0 } else { -1.0 };
                (Vec3::new(0.0, 0.0, sign), overlap_z)
            };

            return Some(BarrierHit {
                push,
                depth: depth + BARRIER_PUSH_PADDING,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{OrientedBox, TrackBuilder};

    fn flat_track() -> SpatialQuery {
        let vertices = vec![
            Vec3::new(-100.0, 0.0, -100.0),
            Vec3::new(100.0, 0.0, -100.0),
            Vec3::new(100.0, 0.0, 100.0),
            Vec3::new(-100.0, 0.0, 100.0),
        ];
        let indices = vec![[0, 1, 2], [0, 2, 3]];
        SpatialQuery::new(
            TrackBuilder::new("flat")
                .surface(vertices, indices)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn downward_ray_hits_ground_with_up_normal() {
        let q = flat_track();
        let hit = q
            .raycast(Vec3::new(3.0, 2.0, -4.0), -Vec3::y(), 10.0)
            .unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::y()).magnitude() < 1e-4);
        assert!(hit.point.y.abs() < 1e-4);
    }

    #[test]
    fn ray_beyond_max_distance_misses() {
        let q = flat_track();
        assert!(q.raycast(Vec3::new(0.0, 5.0, 0.0), -Vec3::y(), 2.0).is_none());
        assert!(q.is_grounded(Vec3::new(0.0, 0.5, 0.0)));
        assert!(!q.is_grounded(Vec3::new(0.0, 50.0, 0.0)));
    }

    #[test]
    fn nearest_surface_wins() {
        // Two stacked planes; a ray from above must report the upper one.
        let plane = |y: f32| {
            (
                vec![
                    Vec3::new(-10.0, y, -10.0),
                    Vec3::new(10.0, y, -10.0),
                    Vec3::new(10.0, y, 10.0),
                    Vec3::new(-10.0, y, 10.0),
                ],
                vec![[0, 1, 2], [0, 2, 3]],
            )
        };
        let (v0, i0) = plane(0.0);
        let (v1, i1) = plane(3.0);
        let q = SpatialQuery::new(
            TrackBuilder::new("stack")
                .surface(v0, i0)
                .surface(v1, i1)
                .build()
                .unwrap(),
        );
        let hit = q.raycast(Vec3::new(0.0, 5.0, 0.0), -Vec3::y(), 10.0).unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-4);
        assert!((hit.point.y - 3.0).abs() < 1e-4);
    }

    #[test]
    fn zero_direction_ray_is_a_miss() {
        let q = flat_track();
        assert!(q.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::zeros(), 10.0).is_none());
    }

    #[test]
    fn barrier_push_takes_shallowest_axis() {
        let vertices = vec![
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(-10.0, 0.0, 10.0),
        ];
        let q = SpatialQuery::new(
            TrackBuilder::new("walled")
                .surface(vertices, vec![[0, 1, 2], [0, 2, 3]])
                .barrier(Vec3::new(2.0, 0.0, -10.0), Vec3::new(3.0, 2.0, 10.0))
                .build()
                .unwrap(),
        );

        // Vehicle box nudged into the wall from the -X side: shallow X overlap.
        let bounds = Aabb::new(
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(2.2, 1.0, 1.0),
        );
        let hit = q.barrier_overlap(&bounds).unwrap();
        assert_eq!(hit.push, Vec3::new(-1.0, 0.0, 0.0));
        assert!((hit.depth - (0.2 + BARRIER_PUSH_PADDING)).abs() < 1e-4);

        // Clear of the wall: no collision.
        let clear = Aabb::new(Point3::new(-2.0, 0.0, -1.0), Point3::new(-1.0, 1.0, 1.0));
        assert!(q.barrier_overlap(&clear).is_none());
    }

    #[test]
    fn zone_lookup_honors_registration_order() {
        let vertices = vec![
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(-10.0, 0.0, 10.0),
        ];
        let zone = OrientedBox::axis_aligned(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let q = SpatialQuery::new(
            TrackBuilder::new("zoned")
                .surface(vertices, vec![[0, 1, 2], [0, 2, 3]])
                .boost_zone(zone, 1.5)
                .boost_zone(zone, 2.0)
                .build()
                .unwrap(),
        );
        let z = q.boost_zone_at(Vec3::new(0.5, 0.5, 0.5)).unwrap();
        assert_eq!(z.multiplier, 1.5);
        assert!(q.boost_zone_at(Vec3::new(5.0, 0.0, 0.0)).is_none());
    }
}
