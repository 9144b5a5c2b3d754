//! Core math aliases and exchange types shared across the crate.
//!
//! This module intentionally contains no physics. It defines the data types
//! exchanged between the spatial queries, the vehicle integrator, and race
//! progression.

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Chassis-local axis conventions: -Z forward, +X right, +Y up.
pub const LOCAL_FORWARD: Vec3 = Vec3::new(0.0, 0.0, -1.0);
pub const LOCAL_RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);
pub const LOCAL_UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// World-space pose of the vehicle chassis.
///
/// Owned exclusively by the vehicle integrator; everything else reads it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` facing along the heading `yaw` (radians about +Y,
    /// zero facing -Z).
    pub fn from_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_axis_angle(&na::Vector3::y_axis(), yaw),
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * LOCAL_FORWARD
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * LOCAL_RIGHT
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * LOCAL_UP
    }

    /// Heading about +Y recovered from the rotation (radians, zero = -Z).
    pub fn yaw(&self) -> f32 {
        let f = self.forward();
        (-f.x).atan2(-f.z)
    }

    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.position.x, self.position.y, self.position.z),
            self.rotation,
        )
    }
}

/// Normalized driver intent, supplied once per tick.
///
/// Input devices are out of scope; whatever produces this must already have
/// unified keyboard/gamepad/touch into these ranges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlInput {
    pub throttle: f32, // 0..1
    pub brake: f32,    // 0..1
    pub steer: f32,    // -1 (full left) .. 1 (full right)
    pub drift: bool,
}

impl ControlInput {
    /// Clamp to the documented ranges. Applied on receipt; the solvers assume
    /// clamped values.
    pub fn clamped(&self) -> Self {
        Self {
            throttle: self.throttle.clamp(0.0, 1.0),
            brake: self.brake.clamp(0.0, 1.0),
            steer: self.steer.clamp(-1.0, 1.0),
            drift: self.drift,
        }
    }

    /// Any nonzero control present this tick.
    pub fn is_active(&self) -> bool {
        self.throttle > 0.01 || self.brake > 0.01 || self.steer.abs() > 0.01 || self.drift
    }
}

/// Normalize `v`, falling back when it is too short to carry a direction.
#[inline]
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let m = v.magnitude();
    if m > 1e-6 { v / m } else { fallback }
}

/// Project `v` onto the plane with unit normal `n`.
#[inline]
pub fn project_on_plane(v: Vec3, n: Vec3) -> Vec3 {
    v - n * v.dot(&n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_zero_faces_negative_z() {
        let pose = Pose::from_yaw(Vec3::zeros(), 0.0);
        let f = pose.forward();
        assert!((f - Vec3::new(0.0, 0.0, -1.0)).magnitude() < 1e-6);
        assert!(pose.yaw().abs() < 1e-6);
    }

    #[test]
    fn yaw_roundtrips_through_rotation() {
        for &yaw in &[0.5_f32, -1.2, 2.9, -2.9] {
            let pose = Pose::from_yaw(Vec3::zeros(), yaw);
            assert!((pose.yaw() - yaw).abs() < 1e-5, "yaw {yaw}");
        }
    }

    #[test]
    fn input_clamping() {
        let raw = ControlInput {
            throttle: 2.0,
            brake: -1.0,
            steer: -7.0,
            drift: false,
        };
        let c = raw.clamped();
        assert_eq!(c.throttle, 1.0);
        assert_eq!(c.brake, 0.0);
        assert_eq!(c.steer, -1.0);
    }

    #[test]
    fn safe_normalize_falls_back_on_zero() {
        let n = safe_normalize(Vec3::zeros(), Vec3::y());
        assert_eq!(n, Vec3::y());
    }
}
