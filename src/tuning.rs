//! Vehicle tuning constants.
//!
//! One explicit structure per vehicle class. Every constant carries its unit
//! and intended effect; per-class differences are expressed as `const`
//! presets, never as divergent code paths.

use crate::types::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct VehicleConfig {
    pub mass: f32,               // kg
    pub acceleration: f32,       // m/s^2 at full throttle
    pub brake_deceleration: f32, // m/s^2 at full brake
    pub max_speed: f32,          // m/s forward
    pub reverse_max_speed: f32,  // m/s in reverse
    pub rolling_resistance: f32, // 1/s exponential speed decay while coasting

    // --- Steering ---
    pub max_steer_angle: f32, // radians at standstill
    pub steer_speed: f32,     // rad/s approach toward the steering target
    pub steer_taper: f32,     // 0..1 steering-range shrink as speed reaches max
    pub air_yaw_rate: f32,    // rad/s yaw authority while airborne

    // --- Geometry ---
    pub wheelbase: f32,                 // meters (front axle to rear axle)
    pub track_width: f32,               // meters (left to right)
    pub wheel_radius: f32,              // meters
    pub suspension_height: f32,         // meters of travel above the wheel
    pub chassis_half_extents: [f32; 3], // [hx, hy, hz] meters

    // --- Suspension ---
    pub suspension_stiffness: f32, // N/m per wheel
    pub suspension_damping: f32,   // N*s/m per wheel

    // --- Tires ---
    pub tire_stiffness: f32, // 1/s lateral-slip correction rate
    pub grip: f32,           // friction coefficient against the normal load
    pub drift_grip: f32,     // fraction of correction kept while drifting

    // --- Aero / gravity ---
    pub downforce: f32, // N per (m/s)^2 of forward speed, along local down
    pub gravity: f32,   // m/s^2
    pub align_rate: f32, // 1/s pitch/roll blend toward the ground normal

    // --- Boost / collision response ---
    pub boost_overshoot: f32,    // boost speed ceiling, as a multiple of max_speed
    pub restitution: f32,        // fraction of inward speed reflected off barriers
    pub collision_friction: f32, // speed kept after a barrier hit
}

impl VehicleConfig {
    /// Suspension rest length: wheel radius plus travel.
    #[inline]
    pub fn rest_length(&self) -> f32 {
        self.wheel_radius + self.suspension_height
    }

    /// Chassis-local wheel mount points: FL, FR, RL, RR.
    ///
    /// Front is -Z; mounts sit at the bottom face of the chassis box.
    pub fn wheel_offsets(&self) -> [Vec3; 4] {
        let hx = self.track_width * 0.5;
        let hy = -self.chassis_half_extents[1];
        let hz = self.wheelbase * 0.5;
        [
            Vec3::new(-hx, hy, -hz),
            Vec3::new(hx, hy, -hz),
            Vec3::new(-hx, hy, hz),
            Vec3::new(hx, hy, hz),
        ]
    }
}

pub const ROADSTER: VehicleConfig = VehicleConfig {
    mass: 1200.0,             // kg
    acceleration: 30.0,       // m/s^2
    brake_deceleration: 45.0, // m/s^2
    max_speed: 90.0,          // m/s (~324 km/h, arcade)
    reverse_max_speed: 12.0,  // m/s
    rolling_resistance: 0.8,  // coasting halves speed in ~0.9 s

    max_steer_angle: 0.6, // radians (~34 degrees)
    steer_speed: 2.5,     // rad/s
    steer_taper: 0.65,    // keeps 35% of the range at top speed
    air_yaw_rate: 1.2,    // rad/s

    wheelbase: 2.5,    // meters
    track_width: 1.5,  // meters
    wheel_radius: 0.35,
    suspension_height: 0.5,
    chassis_half_extents: [1.0, 0.35, 2.1],

    suspension_stiffness: 59_000.0, // ~5 cm static sag
    suspension_damping: 7_500.0,    // ~0.9 critical

    tire_stiffness: 8.0,
    grip: 0.9,
    drift_grip: 0.35,

    downforce: 2.0, // ~1.4x weight at top speed, enough for loops
    gravity: 9.81,
    align_rate: 6.0,

    boost_overshoot: 1.2,
    restitution: 0.35,
    collision_friction: 0.85,
};

pub const JUGGERNAUT: VehicleConfig = VehicleConfig {
    mass: 3200.0,
    acceleration: 14.0,
    brake_deceleration: 30.0,
    max_speed: 55.0,
    reverse_max_speed: 8.0,
    rolling_resistance: 1.2,

    max_steer_angle: 0.5,
    steer_speed: 1.8,
    steer_taper: 0.5,
    air_yaw_rate: 0.8,

    wheelbase: 3.4,
    track_width: 2.0,
    wheel_radius: 0.45,
    suspension_height: 0.55,
    chassis_half_extents: [1.3, 0.5, 2.6],

    suspension_stiffness: 130_000.0,
    suspension_damping: 19_000.0,

    tire_stiffness: 6.0,
    grip: 1.1,
    drift_grip: 0.45,

    downforce: 3.5,
    gravity: 9.81,
    align_rate: 5.0,

    boost_overshoot: 1.15,
    restitution: 0.25,
    collision_friction: 0.8,
};
