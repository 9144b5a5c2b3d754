//! race - progression state machine, race clock, ghost replay, events.

pub mod events;
pub mod ghost;
pub mod progression;
pub mod timer;

pub use events::RaceEvent;
pub use ghost::{GhostFrame, GhostRecorder, GhostTrack};
pub use progression::{RaceConfig, RacePhase, RaceProgression};
pub use timer::RaceTimer;
