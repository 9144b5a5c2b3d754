//! Race progression state machine.
//!
//! Phases: `menu → ready → countdown → playing → {paused ⇄ playing} →
//! finished`. Checkpoint hits count only in cursor order; out-of-order hits
//! are silent no-ops, which is what stops backtracking or corner-cutting from
//! registering progress. Zone containment is edge-triggered: a zone must be
//! exited before it can fire again.
//!
//! Everything here keys off the race clock fed by simulation ticks, so a
//! recorded ghost replays identically regardless of the renderer's frame
//! rate.

use crate::persist::{RecordStore, TrackRecord, load_record, save_record};
use crate::query::SpatialQuery;
use crate::race::events::RaceEvent;
use crate::race::ghost::{GhostRecorder, GhostTrack};
use crate::race::timer::{RaceTimer, is_improvement};
use crate::track::TrackGeometry;
use crate::types::{ControlInput, Pose, Vec3};
use crate::vehicle::VehicleDynamics;

/// Fixed pre-race countdown (race-clock seconds).
pub const COUNTDOWN_SECONDS: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RacePhase {
    Menu,
    Ready,
    Countdown,
    Playing,
    Paused,
    Finished,
}

#[derive(Clone, Copy, Debug)]
pub struct RaceConfig {
    pub total_laps: u32,
    pub checkpoint_count: u32,
    /// Hold the race clock and ghost recording after the countdown until the
    /// first nonzero control input arrives.
    pub wait_for_input: bool,
}

pub struct RaceProgression {
    config: RaceConfig,
    track_id: String,
    spawn_position: Vec3,
    spawn_yaw: f32,

    phase: RacePhase,
    countdown_remaining: f64,
    awaiting_input: bool,

    current_lap: u32,
    next_checkpoint: u32,
    last_valid_position: Vec3,
    last_valid_yaw: f32,

    // Containment edges, so resting inside a zone fires once.
    inside_checkpoint: Option<u32>,
    inside_boost: bool,

    timer: RaceTimer,
    recorder: GhostRecorder,
    best_time: Option<f64>,
    best_ghost: Option<GhostTrack>,

    events: Vec<RaceEvent>,
}

impl RaceProgression {
    pub fn new(track: &TrackGeometry, wait_for_input: bool) -> Self {
        Self {
            config: RaceConfig {
                total_laps: track.lap_count(),
                checkpoint_count: track.checkpoint_count(),
                wait_for_input,
            },
            track_id: track.id().to_string(),
            spawn_position: track.spawn_pose().position,
            spawn_yaw: track.spawn_pose().yaw(),
            phase: RacePhase::Menu,
            countdown_remaining: 0.0,
            awaiting_input: false,
            current_lap: 1,
            next_checkpoint: 0,
            last_valid_position: track.spawn_pose().position,
            last_valid_yaw: track.spawn_pose().yaw(),
            inside_checkpoint: None,
            inside_boost: false,
            timer: RaceTimer::new(),
            recorder: GhostRecorder::new(),
            best_time: None,
            best_ghost: None,
            events: Vec::new(),
        }
    }

    /// Load the stored best time and ghost for this track. Malformed or
    /// missing data is simply no prior record.
    pub fn load_records(&mut self, store: &dyn RecordStore) {
        if let Some(record) = load_record(store, &self.track_id) {
            log::info!(
                "loaded best {:.3}s for track '{}'",
                record.best_time,
                self.track_id
            );
            self.best_time = Some(record.best_time);
            if !record.ghost.is_empty() {
                self.best_ghost = Some(record.ghost);
            }
        }
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Lap currently being driven, 1-based.
    pub fn current_lap(&self) -> u32 {
        self.current_lap
    }

    /// Next checkpoint ordinal the attempt must hit.
    pub fn next_checkpoint(&self) -> u32 {
        self.next_checkpoint
    }

    pub fn race_time(&self) -> f64 {
        self.timer.elapsed()
    }

    pub fn splits(&self) -> &[f64] {
        self.timer.splits()
    }

    pub fn best_time(&self) -> Option<f64> {
        self.best_time
    }

    /// Best-run ghost pose at the current race clock, for rendering alongside
    /// the live vehicle. No-op on empty or single-frame ghosts.
    pub fn ghost_pose(&self) -> Option<Pose> {
        self.best_ghost.as_ref()?.sample(self.timer.elapsed())
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start (or restart) a race attempt: vehicle on the spawn point, cursor
    /// and clock cleared, phase `Ready`.
    pub fn enter_ready(&mut self, vehicle: &mut VehicleDynamics) {
        vehicle.reset(self.spawn_position, self.spawn_yaw);
        self.phase = RacePhase::Ready;
        self.countdown_remaining = 0.0;
        self.awaiting_input = false;
        self.current_lap = 1;
        self.next_checkpoint = 0;
        self.last_valid_position = self.spawn_position;
        self.last_valid_yaw = self.spawn_yaw;
        self.inside_checkpoint = None;
        self.inside_boost = false;
        self.timer.reset();
        self.recorder = GhostRecorder::new();
        self.events.clear();
    }

    /// External trigger: `ready → countdown`.
    pub fn begin_countdown(&mut self) {
        if self.phase == RacePhase::Ready {
            self.phase = RacePhase::Countdown;
            self.countdown_remaining = COUNTDOWN_SECONDS;
        }
    }

    pub fn pause(&mut self) {
        if self.phase == RacePhase::Playing {
            self.phase = RacePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == RacePhase::Paused {
            self.phase = RacePhase::Playing;
        }
    }

    /// Put the vehicle back on the last validated checkpoint. Valid only
    /// while playing; clock, cursor, and ghost state are untouched.
    pub fn reset_to_checkpoint(&mut self, vehicle: &mut VehicleDynamics) {
        if self.phase != RacePhase::Playing {
            return;
        }
        vehicle.reset(self.last_valid_position, self.last_valid_yaw);
    }

    pub fn update(
        &mut self,
        dt: f64,
        input: &ControlInput,
        vehicle: &mut VehicleDynamics,
        query: &SpatialQuery,
        store: &mut dyn RecordStore,
    ) {
        match self.phase {
            RacePhase::Countdown => {
                self.countdown_remaining -= dt;
                if self.countdown_remaining <= 0.0 {
                    self.phase = RacePhase::Playing;
                    self.awaiting_input = self.config.wait_for_input;
                    if !self.awaiting_input {
                        self.start_race();
                    }
                }
            }
            RacePhase::Playing => {
                if self.awaiting_input {
                    if !input.is_active() {
                        return;
                    }
                    self.awaiting_input = false;
                    self.start_race();
                }

                self.timer.update(dt);

                let position = vehicle.position();

                match query.boost_zone_at(position) {
                    Some(zone) if !self.inside_boost => {
                        self.inside_boost = true;
                        vehicle.apply_boost(zone.multiplier);
                        self.events.push(RaceEvent::Boost);
                    }
                    Some(_) => {}
                    None => self.inside_boost = false,
                }

                // A track with zero checkpoints runs free: nothing blocks.
                if self.config.checkpoint_count > 0 {
                    match query.checkpoint_at(position) {
                        Some(zone) => {
                            if self.inside_checkpoint != Some(zone.index) {
                                self.inside_checkpoint = Some(zone.index);
                                self.checkpoint_hit(zone.index, zone.is_finish, vehicle, store);
                            }
                        }
                        None => self.inside_checkpoint = None,
                    }
                }

                if self.phase == RacePhase::Playing {
                    self.recorder.record(self.timer.elapsed(), &vehicle.pose());
                }
            }
            RacePhase::Menu | RacePhase::Ready | RacePhase::Paused | RacePhase::Finished => {}
        }
    }

    fn start_race(&mut self) {
        self.timer.start();
        self.recorder.start();
        self.events.push(RaceEvent::RaceStarted);
        log::info!("race started on '{}'", self.track_id);
    }

    fn checkpoint_hit(
        &mut self,
        index: u32,
        is_finish: bool,
        vehicle: &VehicleDynamics,
        store: &mut dyn RecordStore,
    ) {
        if index != self.next_checkpoint {
            // Backtracking or skipping: no error, no state change.
            return;
        }

        let pose = vehicle.pose();
        self.last_valid_position = pose.position;
        self.last_valid_yaw = pose.yaw();
        self.events.push(RaceEvent::Checkpoint { index, is_finish });
        log::debug!("checkpoint {index} validated (finish: {is_finish})");

        if !is_finish {
            self.next_checkpoint = (self.next_checkpoint + 1) % self.config.checkpoint_count;
            return;
        }

        if self.current_lap >= self.config.total_laps {
            self.finish(store);
        } else {
            let split = self.timer.record_lap();
            let completed = self.current_lap;
            self.current_lap += 1;
            self.next_checkpoint = 0;
            self.events.push(RaceEvent::LapCompleted {
                lap: completed,
                split,
            });
            log::info!("lap {completed} done in {split:.3}s");
        }
    }

    fn finish(&mut self, store: &mut dyn RecordStore) {
        self.timer.record_lap();
        self.timer.stop();
        let time = self.timer.elapsed();
        let ghost = self.recorder.stop();

        let is_new_record = is_improvement(time, self.best_time);
        if is_new_record {
            self.best_time = Some(time);
            save_record(
                store,
                &self.track_id,
                &TrackRecord {
                    best_time: time,
                    splits: self.timer.splits().to_vec(),
                    ghost: ghost.clone(),
                },
            );
            self.best_ghost = Some(ghost);
            log::info!("new record on '{}': {:.3}s", self.track_id, time);
        } else {
            log::info!(
                "finished '{}' in {:.3}s (best {:?})",
                self.track_id,
                time,
                self.best_time
            );
        }

        self.phase = RacePhase::Finished;
        self.events.push(RaceEvent::Finished {
            time,
            best_time: self.best_time,
            is_new_record,
        });
    }
}
