//! Static track geometry.
//!
//! Built once per track load by [`TrackBuilder`] and never mutated during a
//! race; a track switch replaces the whole structure. Mesh generation from
//! authoring data happens upstream. This module only accepts the resulting
//! triangles, volumes, and metadata, and validates them hard: a degenerate
//! track must fail here, not corrupt collision queries later.

use anyhow::{Result, bail};
use parry3d::bounding_volume::Aabb;
use parry3d::shape::Triangle;

use crate::types::{Point3, Pose, Quat, Vec3};

/// An oriented box volume used for checkpoints and boost zones.
#[derive(Clone, Copy, Debug)]
pub struct OrientedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

impl OrientedBox {
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// Axis-aligned volume, the common authoring case.
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center, half_extents, Quat::identity())
    }

    /// Point containment in the box's local frame.
    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.rotation.inverse() * (point - self.center);
        local.x.abs() <= self.half_extents.x
            && local.y.abs() <= self.half_extents.y
            && local.z.abs() <= self.half_extents.z
    }
}

/// A drivable surface: a triangle soup in world space.
#[derive(Clone, Debug)]
pub struct Surface {
    pub triangles: Vec<Triangle>,
}

#[derive(Clone, Copy, Debug)]
pub struct BoostZone {
    pub volume: OrientedBox,
    pub multiplier: f32, // forward-speed multiplier on entry
}

#[derive(Clone, Copy, Debug)]
pub struct CheckpointZone {
    pub volume: OrientedBox,
    pub index: u32,
    pub is_finish: bool,
}

/// Summary handed to race progression after a successful load.
#[derive(Clone, Copy, Debug)]
pub struct TrackSummary {
    pub spawn_position: Vec3,
    pub spawn_yaw: f32,
    pub checkpoint_count: u32,
}

/// Immutable collidable track set plus race metadata.
#[derive(Clone, Debug)]
pub struct TrackGeometry {
    pub(crate) id: String,
    pub(crate) surfaces: Vec<Surface>,
    pub(crate) barriers: Vec<Aabb>,
    pub(crate) boost_zones: Vec<BoostZone>,
    pub(crate) checkpoints: Vec<CheckpointZone>,
    pub(crate) spawn_position: Vec3,
    pub(crate) spawn_yaw: f32,
    pub(crate) lap_count: u32,
}

impl TrackGeometry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lap_count(&self) -> u32 {
        self.lap_count
    }

    pub fn checkpoint_count(&self) -> u32 {
        self.checkpoints.len() as u32
    }

    pub fn spawn_pose(&self) -> Pose {
        Pose::from_yaw(self.spawn_position, self.spawn_yaw)
    }

    pub fn summary(&self) -> TrackSummary {
        TrackSummary {
            spawn_position: self.spawn_position,
            spawn_yaw: self.spawn_yaw,
            checkpoint_count: self.checkpoint_count(),
        }
    }
}

/// Validating builder for [`TrackGeometry`].
///
/// Checkpoint ordinals follow registration order; the finish line is always
/// the last ordinal and must be registered exactly once when any checkpoints
/// exist.
pub struct TrackBuilder {
    id: String,
    surface_inputs: Vec<(Vec<Vec3>, Vec<[u32; 3]>)>,
    barriers: Vec<Aabb>,
    boost_zones: Vec<BoostZone>,
    checkpoints: Vec<OrientedBox>,
    finish: Option<OrientedBox>,
    spawn_position: Vec3,
    spawn_yaw: f32,
    lap_count: u32,
}

impl TrackBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            surface_inputs: Vec::new(),
            barriers: Vec::new(),
            boost_zones: Vec::new(),
            checkpoints: Vec::new(),
            finish: None,
            spawn_position: Vec3::zeros(),
            spawn_yaw: 0.0,
            lap_count: 1,
        }
    }

    pub fn spawn(mut self, position: Vec3, yaw: f32) -> Self {
        self.spawn_position = position;
        self.spawn_yaw = yaw;
        self
    }

    pub fn laps(mut self, count: u32) -> Self {
        self.lap_count = count;
        self
    }

    /// Register a drivable surface from an indexed vertex list. Triangulation
    /// happens in `build()`, after the inputs have been validated.
    pub fn surface(mut self, vertices: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        self.surface_inputs.push((vertices, indices));
        self
    }

    pub fn barrier(mut self, mins: Vec3, maxs: Vec3) -> Self {
        self.barriers.push(Aabb::new(
            Point3::new(mins.x, mins.y, mins.z),
            Point3::new(maxs.x, maxs.y, maxs.z),
        ));
        self
    }

    pub fn boost_zone(mut self, volume: OrientedBox, multiplier: f32) -> Self {
        self.boost_zones.push(BoostZone { volume, multiplier });
        self
    }

    /// Register an intermediate checkpoint. Ordinals follow call order.
    pub fn checkpoint(mut self, volume: OrientedBox) -> Self {
        self.checkpoints.push(volume);
        self
    }

    /// Register the finish line. Always the last checkpoint ordinal.
    pub fn finish_line(mut self, volume: OrientedBox) -> Self {
        self.finish = Some(volume);
        self
    }

    pub fn build(self) -> Result<TrackGeometry> {
        if self.lap_count == 0 {
            bail!("track '{}': lap count must be at least 1", self.id);
        }
        if self.surface_inputs.is_empty() {
            bail!("track '{}': no drivable surfaces registered", self.id);
        }

        for (i, (vertices, indices)) in self.surface_inputs.iter().enumerate() {
            if vertices.len() < 3 {
                bail!(
                    "track '{}': surface {} has {} vertices, need at least 3",
                    self.id,
                    i,
                    vertices.len()
                );
            }
            if indices.is_empty() {
                bail!("track '{}': surface {} has no triangles", self.id, i);
            }
            for v in vertices {
                if !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()) {
                    bail!("track '{}': surface {} has a non-finite vertex", self.id, i);
                }
            }
            for idx in indices {
                for &k in idx {
                    if k as usize >= vertices.len() {
                        bail!(
                            "track '{}': surface {} index {} out of range ({} vertices)",
                            self.id,
                            i,
                            k,
                            vertices.len()
                        );
                    }
                }
                let [a, b, c] = [
                    vertices[idx[0] as usize],
                    vertices[idx[1] as usize],
                    vertices[idx[2] as usize],
                ];
                if (b - a).cross(&(c - a)).magnitude() < 1e-9 {
                    bail!(
                        "track '{}': surface {} contains a degenerate triangle {:?}",
                        self.id,
                        i,
                        idx
                    );
                }
            }
        }

        for (i, b) in self.barriers.iter().enumerate() {
            if !(b.mins.x < b.maxs.x && b.mins.y < b.maxs.y && b.mins.z < b.maxs.z) {
                bail!("track '{}': barrier {} has inverted or empty extents", self.id, i);
            }
        }
        for (i, z) in self.boost_zones.iter().enumerate() {
            if z.multiplier < 1.0 {
                bail!(
                    "track '{}': boost zone {} multiplier {} would slow the vehicle",
                    self.id,
                    i,
                    z.multiplier
                );
            }
            validate_volume(&self.id, "boost zone", i, &z.volume)?;
        }
        for (i, v) in self.checkpoints.iter().enumerate() {
            validate_volume(&self.id, "checkpoint", i, v)?;
        }

        if !self.checkpoints.is_empty() && self.finish.is_none() {
            bail!(
                "track '{}': {} checkpoints registered but no finish line",
                self.id,
                self.checkpoints.len()
            );
        }

        let mut checkpoints: Vec<CheckpointZone> = self
            .checkpoints
            .into_iter()
            .enumerate()
            .map(|(i, volume)| CheckpointZone {
                volume,
                index: i as u32,
                is_finish: false,
            })
            .collect();
        if let Some(volume) = self.finish {
            validate_volume(&self.id, "finish line", 0, &volume)?;
            checkpoints.push(CheckpointZone {
                volume,
                index: checkpoints.len() as u32,
                is_finish: true,
            });
        }

        let surfaces: Vec<Surface> = self
            .surface_inputs
            .iter()
            .map(|(vertices, indices)| Surface {
                triangles: indices
                    .iter()
                    .map(|idx| {
                        let p = |k: u32| {
                            let v = vertices[k as usize];
                            Point3::new(v.x, v.y, v.z)
                        };
                        Triangle::new(p(idx[0]), p(idx[1]), p(idx[2]))
                    })
                    .collect(),
            })
            .collect();

        log::info!(
            "track '{}' built: {} surfaces, {} barriers, {} boost zones, {} checkpoints, {} laps",
            self.id,
            surfaces.len(),
            self.barriers.len(),
            self.boost_zones.len(),
            checkpoints.len(),
            self.lap_count
        );

        Ok(TrackGeometry {
            id: self.id,
            surfaces,
            barriers: self.barriers,
            boost_zones: self.boost_zones,
            checkpoints,
            spawn_position: self.spawn_position,
            spawn_yaw: self.spawn_yaw,
            lap_count: self.lap_count,
        })
    }
}

fn validate_volume(track: &str, kind: &str, index: usize, v: &OrientedBox) -> Result<()> {
    if !(v.half_extents.x > 0.0 && v.half_extents.y > 0.0 && v.half_extents.z > 0.0) {
        bail!("track '{track}': {kind} {index} has non-positive half extents");
    }
    Ok(())
}
