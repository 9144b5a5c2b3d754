//! Vehicle dynamics: pose + velocity ownership and the per-tick integrator.
//!
//! State machine over {grounded, airborne}. Each tick:
//! 1. Suspension pass: four wheel rays, spring/damper impulses, ground
//!    normal from the average of contacted wheel normals.
//! 2. Grounded branch: longitudinal/lateral resolution on the wheel basis,
//!    bicycle yaw, normal-aligned gravity, speed-squared downforce.
//!    Airborne branch: world gravity plus limited yaw authority.
//! 3. Orientation alignment toward the ground normal (yaw preserved), every
//!    tick regardless of branch.
//! 4. Position integration, bounding-box and signed-speed refresh.
//!
//! Gravity follows the ground normal while grounded, which is what lets a
//! fast vehicle hold loops and banked walls; airborne gravity is world-down.

use nalgebra::Unit;
use parry3d::bounding_volume::Aabb;
use parry3d::shape::Cuboid;

use crate::handling::lateral::solve_lateral;
use crate::handling::longitudinal::advance_forward_speed;
use crate::handling::state::GripState;
use crate::handling::steering::{advance_steer_angle, steer_target, yaw_rate};
use crate::handling::suspension::{sample_wheel, suspension_force};
use crate::query::SpatialQuery;
use crate::tuning::VehicleConfig;
use crate::types::{
    ControlInput, LOCAL_FORWARD, LOCAL_RIGHT, LOCAL_UP, Pose, Quat, Vec3, project_on_plane,
    safe_normalize,
};

/// Wheel rays start slightly above the mount so a mount resting exactly on
/// the surface still registers a hit.
pub const WHEEL_RAY_LIFT: f32 = 0.02;

/// Positions beyond this are treated as a blown-up integration and the tick
/// is reverted.
pub const POSITION_LIMIT: f32 = 10_000.0;

pub struct VehicleDynamics {
    config: VehicleConfig,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    steer_angle: f32, // radians, rate-limited toward the steering target
    grounded: bool,
    ground_normal: Vec3, // retained across brief airborne frames
    grip_state: GripState,
    speed: f32, // signed projection onto the forward axis
    bounds: Aabb,
}

impl VehicleDynamics {
    pub fn new(config: VehicleConfig, position: Vec3, yaw: f32) -> Self {
        let mut v = Self {
            config,
            position,
            rotation: Quat::identity(),
            velocity: Vec3::zeros(),
            steer_angle: 0.0,
            grounded: false,
            ground_normal: Vec3::y(),
            grip_state: GripState::Grip,
            speed: 0.0,
            bounds: Aabb::new_invalid(),
        };
        v.reset(position, yaw);
        v
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Signed forward speed; negative means reversing.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_drifting(&self) -> bool {
        self.grip_state == GripState::Drift
    }

    pub fn ground_normal(&self) -> Vec3 {
        self.ground_normal
    }

    /// World-space bounding box for barrier queries.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// Hard reset to a spawn point. Zeroes all velocity and derived state.
    pub fn reset(&mut self, position: Vec3, yaw: f32) {
        self.position = position;
        self.rotation = Quat::from_axis_angle(&nalgebra::Vector3::y_axis(), yaw);
        self.velocity = Vec3::zeros();
        self.steer_angle = 0.0;
        self.grounded = false;
        self.ground_normal = Vec3::y();
        self.grip_state = GripState::Grip;
        self.speed = 0.0;
        self.refresh_derived();
    }

    pub fn update(&mut self, input: &ControlInput, dt: f32, query: &SpatialQuery) {
        if dt <= 0.0 {
            return;
        }
        let input = input.clamped();
        let prev_position = self.position;

        self.suspension_pass(dt, query);

        if self.grounded {
            self.update_grounded(&input, dt);
        } else {
            self.update_airborne(&input, dt);
        }

        self.align_to_ground(dt);

        self.position += self.velocity * dt;

        if !self.pose_is_sane() {
            log::warn!(
                "vehicle pose escaped sane range at {:?}; reverting tick",
                self.position
            );
            self.position = prev_position;
            self.velocity = Vec3::zeros();
        }

        self.refresh_derived();
    }

    /// Forward-speed multiplier from a boost zone. Lateral velocity is left
    /// untouched; the result is capped above max_speed by the overshoot
    /// allowance and never slows the vehicle.
    pub fn apply_boost(&mut self, multiplier: f32) {
        let forward = self.rotation * LOCAL_FORWARD;
        let v_fwd = self.velocity.dot(&forward);
        let cap = self.config.max_speed * self.config.boost_overshoot;
        let boosted = (v_fwd * multiplier).min(cap).max(v_fwd);
        self.velocity += forward * (boosted - v_fwd);
        self.refresh_derived();
    }

    /// Soft barrier response: push out along `normal`, drop the inward
    /// velocity component, reflect a restitution fraction back out, and bleed
    /// overall speed.
    pub fn apply_collision(&mut self, normal: Vec3, penetration: f32) {
        let m = normal.magnitude();
        if m < 1e-6 || penetration <= 0.0 {
            return;
        }
        let n = normal / m;

        self.position += n * penetration;

        let v_n = self.velocity.dot(&n);
        if v_n < 0.0 {
            self.velocity -= n * v_n;
            self.velocity += n * (-v_n * self.config.restitution);
            self.velocity *= self.config.collision_friction;
        }

        self.refresh_derived();
    }

    // ----------------------------------------------------------------------
    // Suspension pass: rays along vehicle-local down from each wheel mount.
    // ----------------------------------------------------------------------
    fn suspension_pass(&mut self, dt: f32, query: &SpatialQuery) {
        let up = self.rotation * LOCAL_UP;
        let down = -up;
        let rest = self.config.rest_length() + WHEEL_RAY_LIFT;

        let mut normal_sum = Vec3::zeros();
        let mut contacts = 0u32;

        for offset in self.config.wheel_offsets() {
            let mount = self.position + self.rotation * offset + up * WHEEL_RAY_LIFT;
            let sample = sample_wheel(query, mount, down, rest);
            if !sample.grounded {
                continue;
            }
            contacts += 1;
            normal_sum += sample.normal;

            let compression = (rest - sample.distance).clamp(0.0, self.config.suspension_height);
            if compression <= 0.0 {
                continue;
            }
            let suspension_vel = self.velocity.dot(&sample.normal);
            let force = suspension_force(
                compression,
                suspension_vel,
                self.config.suspension_stiffness,
                self.config.suspension_damping,
            );
            self.velocity += sample.normal * (force * dt / self.config.mass.max(1.0));
        }

        self.grounded = contacts > 0;
        if self.grounded {
            // Brief loss of contact keeps the previous normal; only fresh
            // contact replaces it.
            self.ground_normal = safe_normalize(normal_sum, self.ground_normal);
        }
    }

    fn update_grounded(&mut self, input: &ControlInput, dt: f32) {
        let n = self.ground_normal;
        let raw_forward = self.rotation * LOCAL_FORWARD;
        let forward = safe_normalize(project_on_plane(raw_forward, n), raw_forward);
        let side = safe_normalize(forward.cross(&n), self.rotation * LOCAL_RIGHT);

        let mut v_fwd = self.velocity.dot(&forward);
        let v_lat = self.velocity.dot(&side);
        let v_norm = self.velocity.dot(&n);

        v_fwd = advance_forward_speed(&self.config, input.throttle, input.brake, v_fwd, dt);

        let target = steer_target(&self.config, input.steer, v_fwd);
        self.steer_angle =
            advance_steer_angle(self.steer_angle, target, self.config.steer_speed, dt);
        let yaw = yaw_rate(&self.config, v_fwd, self.steer_angle);
        if yaw.abs() > 1e-6 {
            let axis = Unit::new_normalize(n);
            self.rotation = Quat::from_axis_angle(&axis, -yaw * dt) * self.rotation;
        }

        let lat = solve_lateral(&self.config, v_lat, v_fwd, input.drift, self.grip_state);
        self.grip_state = lat.state;
        let v_lat = v_lat + lat.accel * dt;

        self.velocity = forward * v_fwd + side * v_lat + n * v_norm;

        // Gravity sticks to the surface; downforce presses along local down,
        // growing with the square of forward speed.
        self.velocity -= n * (self.config.gravity * dt);
        let local_down = -(self.rotation * LOCAL_UP);
        let downforce_accel = self.config.downforce * v_fwd * v_fwd / self.config.mass.max(1.0);
        self.velocity += local_down * (downforce_accel * dt);
    }

    fn update_airborne(&mut self, input: &ControlInput, dt: f32) {
        self.velocity.y -= self.config.gravity * dt;

        // No grip model in the air: limited yaw authority only.
        if input.steer.abs() > 0.01 {
            let axis = Unit::new_normalize(self.rotation * LOCAL_UP);
            self.rotation =
                Quat::from_axis_angle(&axis, -input.steer * self.config.air_yaw_rate * dt)
                    * self.rotation;
        }

        // Keep tracking the steering target so a landing is not snappy.
        let target = steer_target(&self.config, input.steer, self.speed);
        self.steer_angle =
            advance_steer_angle(self.steer_angle, target, self.config.steer_speed, dt);
    }

    /// Blend pitch/roll toward the ground normal while preserving yaw. Runs
    /// every tick; while airborne it keeps leaning toward the last contact
    /// normal, which avoids visual snapping over crests.
    fn align_to_ground(&mut self, dt: f32) {
        let up = self.rotation * LOCAL_UP;
        let t = (self.config.align_rate * dt).clamp(0.0, 1.0);
        if let Some(delta) = Quat::rotation_between(&up, &self.ground_normal) {
            self.rotation = Quat::identity().slerp(&delta, t) * self.rotation;
        }
    }

    fn pose_is_sane(&self) -> bool {
        let p = self.position;
        p.x.is_finite()
            && p.y.is_finite()
            && p.z.is_finite()
            && p.x.abs() < POSITION_LIMIT
            && p.y.abs() < POSITION_LIMIT
            && p.z.abs() < POSITION_LIMIT
    }

    fn refresh_derived(&mut self) {
        let [hx, hy, hz] = self.config.chassis_half_extents;
        self.bounds = Cuboid::new(Vec3::new(hx, hy, hz)).aabb(&self.pose().iso());
        let forward = self.rotation * LOCAL_FORWARD;
        self.speed = self.velocity.dot(&forward);
    }
}
