//! driftline - arcade driving physics and race progression core.
//!
//! Simulates a vehicle over arbitrary 3D track geometry (raycast suspension,
//! slip-based tires, normal-aligned gravity for loops) and arbitrates race
//! progression: ordered checkpoints, laps, a tick-driven race clock, ghost
//! recording/playback, and best-time persistence.
//!
//! Rendering, audio, menus, and input devices live outside; the core consumes
//! a normalized [`types::ControlInput`] per tick and exposes pose, speed, and
//! race state.

pub mod collision;
pub mod handling;
pub mod persist;
pub mod query;
pub mod race;
pub mod sim;
pub mod track;
pub mod tuning;
pub mod types;
pub mod vehicle;

pub use persist::{MemoryStore, RecordStore, TrackRecord};
pub use query::SpatialQuery;
pub use race::{GhostTrack, RaceEvent, RacePhase, RaceProgression};
pub use sim::{FIXED_STEP, FIXED_TICK_HZ, Simulation};
pub use track::{OrientedBox, TrackBuilder, TrackGeometry, TrackSummary};
pub use tuning::{JUGGERNAUT, ROADSTER, VehicleConfig};
pub use types::{ControlInput, Pose};
pub use vehicle::VehicleDynamics;
