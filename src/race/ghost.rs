//! Ghost recording and playback.
//!
//! A ghost is the best run's trajectory, sampled at a fixed race-clock
//! interval and replayed by time interpolation: linear for position,
//! shortest-arc spherical for rotation. Playback advances by the race clock,
//! never wall clock, so a ghost compares identically at any frame rate.

use nalgebra::Quaternion;
use serde::{Deserialize, Serialize};

use crate::types::{Pose, Quat, Vec3};

/// Seconds of race clock between recorded frames.
pub const GHOST_SAMPLE_INTERVAL: f64 = 0.1;

/// Smallest usable time span between two frames (guards the interpolation
/// divide).
const MIN_FRAME_SPAN: f64 = 1.0e-6;

/// One trajectory sample. Stored as plain arrays so the persisted encoding
/// is stable and self-describing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostFrame {
    pub t: f64,         // race-clock seconds
    pub pos: [f32; 3],
    pub rot: [f32; 4],  // quaternion [i, j, k, w]
}

impl GhostFrame {
    pub fn from_pose(t: f64, pose: &Pose) -> Self {
        let q = pose.rotation.quaternion();
        Self {
            t,
            pos: [pose.position.x, pose.position.y, pose.position.z],
            rot: [q.i, q.j, q.k, q.w],
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(
            Vec3::new(self.pos[0], self.pos[1], self.pos[2]),
            Quat::from_quaternion(Quaternion::new(
                self.rot[3],
                self.rot[0],
                self.rot[1],
                self.rot[2],
            )),
        )
    }
}

/// An ordered (by timestamp) trajectory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GhostTrack {
    frames: Vec<GhostFrame>,
}

impl GhostTrack {
    pub fn new(frames: Vec<GhostFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[GhostFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pose at race-clock time `t`. Empty or single-frame tracks yield
    /// nothing; outside the recorded range the nearest end frame is held.
    pub fn sample(&self, t: f64) -> Option<Pose> {
        if self.frames.len() < 2 {
            return None;
        }
        let first = &self.frames[0];
        let last = &self.frames[self.frames.len() - 1];
        if t <= first.t {
            return Some(first.pose());
        }
        if t >= last.t {
            return Some(last.pose());
        }

        // First frame strictly after t; the one before it starts the span.
        let after = self.frames.partition_point(|f| f.t <= t);
        let a = &self.frames[after - 1];
        let b = &self.frames[after];

        let span = (b.t - a.t).max(MIN_FRAME_SPAN);
        let s = (((t - a.t) / span) as f32).clamp(0.0, 1.0);

        let pa = a.pose();
        let pb = b.pose();
        let position = pa.position + (pb.position - pa.position) * s;

        // Shortest arc: flip one endpoint when the quaternions sit on
        // opposite hemispheres, then slerp.
        let qa = pa.rotation;
        let mut qb = pb.rotation;
        if qa.quaternion().dot(qb.quaternion()) < 0.0 {
            qb = Quat::from_quaternion(-qb.into_inner());
        }
        let rotation = qa.slerp(&qb, s);

        Some(Pose::new(position, rotation))
    }
}

/// Records frames at [`GHOST_SAMPLE_INTERVAL`] while active.
#[derive(Clone, Debug, Default)]
pub struct GhostRecorder {
    frames: Vec<GhostFrame>,
    next_sample: f64,
    active: bool,
}

impl GhostRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.frames.clear();
        self.next_sample = 0.0;
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Offer the current pose at race-clock `t`; a frame is kept only when
    /// the sampling interval has elapsed.
    pub fn record(&mut self, t: f64, pose: &Pose) {
        if !self.active || t < self.next_sample {
            return;
        }
        self.frames.push(GhostFrame::from_pose(t, pose));
        // Advance by whole intervals so tick-size remainders never accumulate
        // into sampling drift.
        self.next_sample += GHOST_SAMPLE_INTERVAL;
    }

    /// Stop recording and take the finished track.
    pub fn stop(&mut self) -> GhostTrack {
        self.active = false;
        GhostTrack::new(std::mem::take(&mut self.frames))
    }
}
