//! Fixed-timestep simulation orchestrator.
//!
//! Physics runs at a fixed 60 Hz regardless of the caller's frame rate: frame
//! time accumulates and whole ticks are consumed in order (vehicle update →
//! barrier resolution → progression → clock). Pausing freezes the
//! accumulator, so no partial-tick state survives across a pause boundary.

use crate::collision::resolve_barriers;
use crate::persist::RecordStore;
use crate::query::SpatialQuery;
use crate::race::events::RaceEvent;
use crate::race::progression::{RacePhase, RaceProgression};
use crate::track::{TrackGeometry, TrackSummary};
use crate::tuning::VehicleConfig;
use crate::types::ControlInput;
use crate::vehicle::VehicleDynamics;

pub const FIXED_TICK_HZ: u32 = 60;
pub const FIXED_STEP: f32 = 1.0 / FIXED_TICK_HZ as f32;

/// Prevents a spiral of death after a long stall: any frame longer than this
/// is clamped before accumulation.
pub const MAX_FRAME_TIME: f32 = 0.25;

pub struct Simulation {
    query: SpatialQuery,
    vehicle: VehicleDynamics,
    progression: RaceProgression,
    store: Box<dyn RecordStore>,
    accumulator: f32,
    wait_for_input: bool,
}

impl Simulation {
    pub fn new(
        track: TrackGeometry,
        config: VehicleConfig,
        store: Box<dyn RecordStore>,
        wait_for_input: bool,
    ) -> Self {
        let spawn = track.spawn_pose();
        let vehicle = VehicleDynamics::new(config, spawn.position, spawn.yaw());
        let mut progression = RaceProgression::new(&track, wait_for_input);
        progression.load_records(store.as_ref());
        Self {
            query: SpatialQuery::new(track),
            vehicle,
            progression,
            store,
            accumulator: 0.0,
            wait_for_input,
        }
    }

    /// Swap in a new track wholesale. All race and collision state tied to
    /// the old track is dropped before the next tick can run.
    pub fn load_track(&mut self, track: TrackGeometry) {
        let spawn = track.spawn_pose();
        self.progression = RaceProgression::new(&track, self.wait_for_input);
        self.progression.load_records(self.store.as_ref());
        self.query.replace(track);
        self.vehicle.reset(spawn.position, spawn.yaw());
        self.accumulator = 0.0;
    }

    pub fn summary(&self) -> TrackSummary {
        self.query.track().summary()
    }

    pub fn vehicle(&self) -> &VehicleDynamics {
        &self.vehicle
    }

    pub fn progression(&self) -> &RaceProgression {
        &self.progression
    }

    pub fn phase(&self) -> RacePhase {
        self.progression.phase()
    }

    /// Reset the attempt and arm the countdown.
    pub fn begin_race(&mut self) {
        self.progression.enter_ready(&mut self.vehicle);
        self.progression.begin_countdown();
    }

    pub fn pause(&mut self) {
        self.progression.pause();
    }

    pub fn resume(&mut self) {
        self.progression.resume();
    }

    pub fn reset_to_checkpoint(&mut self) {
        self.progression.reset_to_checkpoint(&mut self.vehicle);
    }

    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        self.progression.drain_events()
    }

    /// Advance by one rendered frame's worth of time, consuming as many
    /// whole fixed ticks as have accumulated.
    pub fn advance(&mut self, frame_dt: f32, input: &ControlInput) {
        if self.phase() == RacePhase::Paused {
            // Frozen: time spent paused must not produce ticks on resume.
            return;
        }
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_TIME);
        while self.accumulator >= FIXED_STEP {
            self.accumulator -= FIXED_STEP;
            self.step(input);
        }
    }

    /// One fully-ordered fixed tick.
    fn step(&mut self, input: &ControlInput) {
        match self.phase() {
            RacePhase::Playing => {
                self.vehicle.update(input, FIXED_STEP, &self.query);
                resolve_barriers(&mut self.vehicle, &self.query);
                self.progression.update(
                    FIXED_STEP as f64,
                    input,
                    &mut self.vehicle,
                    &self.query,
                    self.store.as_mut(),
                );
            }
            RacePhase::Countdown => {
                // The vehicle holds its grid slot; only the countdown runs.
                self.progression.update(
                    FIXED_STEP as f64,
                    input,
                    &mut self.vehicle,
                    &self.query,
                    self.store.as_mut(),
                );
            }
            RacePhase::Menu | RacePhase::Ready | RacePhase::Paused | RacePhase::Finished => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use crate::track::TrackBuilder;
    use crate::tuning::ROADSTER;
    use crate::types::Vec3;

    fn flat_sim() -> Simulation {
        let vertices = vec![
            Vec3::new(-500.0, 0.0, -500.0),
            Vec3::new(500.0, 0.0, -500.0),
            Vec3::new(500.0, 0.0, 500.0),
            Vec3::new(-500.0, 0.0, 500.0),
        ];
        let spawn_y = ROADSTER.chassis_half_extents[1] + ROADSTER.rest_length() * 0.92;
        let track = TrackBuilder::new("flat")
            .surface(vertices, vec![[0, 1, 2], [0, 2, 3]])
            .spawn(Vec3::new(0.0, spawn_y, 0.0), 0.0)
            .build()
            .unwrap();
        Simulation::new(track, ROADSTER, Box::new(MemoryStore::new()), false)
    }

    #[test]
    fn accumulator_consumes_whole_ticks() {
        let mut sim = flat_sim();
        sim.begin_race();
        let idle = ControlInput::default();

        // 3.5 simulated seconds at an odd frame rate: countdown (3 s) elapses
        // and play begins, regardless of frame cadence.
        for _ in 0..70 {
            sim.advance(0.05, &idle);
        }
        assert_eq!(sim.phase(), RacePhase::Playing);
        assert!(sim.progression().race_time() > 0.0);
    }

    #[test]
    fn half_tick_frames_do_not_tick_twice() {
        let mut sim = flat_sim();
        sim.begin_race();
        let idle = ControlInput::default();
        // Two half-step frames make exactly one tick.
        sim.advance(FIXED_STEP * 0.5, &idle);
        sim.advance(FIXED_STEP * 0.5, &idle);
        // 3 s countdown minus one tick remains; still counting down.
        assert_eq!(sim.phase(), RacePhase::Countdown);
    }

    #[test]
    fn pause_freezes_the_accumulator() {
        let mut sim = flat_sim();
        sim.begin_race();
        let idle = ControlInput::default();
        for _ in 0..200 {
            sim.advance(FIXED_STEP, &idle);
        }
        assert_eq!(sim.phase(), RacePhase::Playing);

        let clock = sim.progression().race_time();
        let pos = sim.vehicle().position();
        sim.pause();
        for _ in 0..120 {
            sim.advance(FIXED_STEP, &idle);
        }
        assert_eq!(sim.progression().race_time(), clock);
        assert_eq!(sim.vehicle().position(), pos);

        sim.resume();
        sim.advance(FIXED_STEP, &idle);
        assert!(sim.progression().race_time() > clock);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut sim = flat_sim();
        sim.begin_race();
        let idle = ControlInput::default();
        // A 10 s hitch must not fast-forward the countdown in one call.
        sim.advance(10.0, &idle);
        assert_eq!(sim.phase(), RacePhase::Countdown);
    }

    #[test]
    fn driving_moves_the_vehicle_after_countdown() {
        let mut sim = flat_sim();
        sim.begin_race();
        let throttle = ControlInput {
            throttle: 1.0,
            ..Default::default()
        };
        for _ in 0..400 {
            sim.advance(FIXED_STEP, &throttle);
        }
        assert_eq!(sim.phase(), RacePhase::Playing);
        assert!(sim.vehicle().position().z < -10.0);
        assert!(sim.vehicle().speed() > 10.0);
    }

    #[test]
    fn load_track_resets_everything() {
        let mut sim = flat_sim();
        sim.begin_race();
        let throttle = ControlInput {
            throttle: 1.0,
            ..Default::default()
        };
        for _ in 0..400 {
            sim.advance(FIXED_STEP, &throttle);
        }

        let vertices = vec![
            Vec3::new(-50.0, 0.0, -50.0),
            Vec3::new(50.0, 0.0, -50.0),
            Vec3::new(50.0, 0.0, 50.0),
            Vec3::new(-50.0, 0.0, 50.0),
        ];
        let other = TrackBuilder::new("other")
            .surface(vertices, vec![[0, 1, 2], [0, 2, 3]])
            .spawn(Vec3::new(3.0, 1.0, 3.0), 0.5)
            .build()
            .unwrap();
        sim.load_track(other);

        assert_eq!(sim.phase(), RacePhase::Menu);
        assert_eq!(sim.vehicle().speed(), 0.0);
        assert!((sim.vehicle().position() - Vec3::new(3.0, 1.0, 3.0)).magnitude() < 1e-6);
        assert_eq!(sim.summary().checkpoint_count, 0);
    }
}
