//! Best-time and ghost persistence.
//!
//! The storage medium is external; this core only needs get/set string
//! payloads keyed by track identifier. Records are JSON. Anything that fails
//! to decode is treated as "no prior record"; persistence failures must
//! never take down a race.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::race::ghost::GhostTrack;

/// Get/set-by-key storage, last-write-wins.
pub trait RecordStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store; also the test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

/// Persisted record for one track: the best overall time, its lap splits,
/// and the ghost trajectory of that run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub best_time: f64,
    pub splits: Vec<f64>,
    pub ghost: GhostTrack,
}

pub fn load_record(store: &dyn RecordStore, track_id: &str) -> Option<TrackRecord> {
    let raw = store.get(track_id)?;
    match serde_json::from_str(&raw) {
        Ok(record) => Some(record),
        Err(err) => {
            log::warn!("discarding malformed record for track '{track_id}': {err}");
            None
        }
    }
}

pub fn save_record(store: &mut dyn RecordStore, track_id: &str, record: &TrackRecord) {
    match serde_json::to_string(record) {
        Ok(raw) => store.set(track_id, raw),
        Err(err) => log::warn!("failed to encode record for track '{track_id}': {err}"),
    }
}
