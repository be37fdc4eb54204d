//! Rules deciding whether a candidate may overwrite a stored record.

use crate::config::FuseConfig;
use crate::object::{Payload, RecordKey, TargetKind};

use super::record::{Candidate, Record};

/// Conflict resolution between sources reporting the same key.
///
/// A candidate wins if its source ranks at least as high as the one that
/// wrote the record, or if the record has gone `reclaim_age` ticks without
/// an update. Aircraft additionally need a strictly newer report time and
/// never fall back from FLARM to transponder data while the FLARM data is
/// fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionPolicy {
    pub reclaim_age: u32,
    /// Lock the own position after the first good GPS fix
    pub ground_mode: bool,
}

impl FusionPolicy {
    pub fn new(reclaim_age: u32, ground_mode: bool) -> Self {
        Self {
            reclaim_age,
            ground_mode,
        }
    }

    pub fn from_config(config: &FuseConfig) -> Self {
        Self::new(config.store.reclaim_age, config.general.ground_mode)
    }

    pub fn can_merge(&self, current: &Record, candidate: &Candidate) -> bool {
        if current.kind() != candidate.kind() {
            return false;
        }

        let baseline =
            candidate.priority >= current.priority || current.age >= self.reclaim_age;
        if !baseline {
            return false;
        }

        match (&current.payload, &candidate.payload) {
            (Payload::Aircraft(stored), Payload::Aircraft(incoming)) => {
                candidate.time > current.content_time
                    && (stored.target_kind == TargetKind::Transponder
                        || incoming.target_kind == TargetKind::Flarm)
            }
            (Payload::GpsFix(stored), Payload::GpsFix(_)) => !stored.is_locked(),
            _ => true,
        }
    }

    /// Apply `candidate` to `current` if allowed. Returns whether it was.
    pub fn merge(&self, current: &mut Record, candidate: Candidate) -> bool {
        if !self.can_merge(current, &candidate) {
            return false;
        }

        current.priority = candidate.priority;
        current.content_time = candidate.time;
        current.payload = candidate.payload;
        current.age = 0;
        current.touched = true;
        current.buffer.clear();
        self.lock_if_grounded(current);
        true
    }

    /// Build the record for a key seen for the first time
    pub fn create(&self, key: RecordKey, candidate: Candidate) -> Record {
        let mut record = Record::from_candidate(key, candidate);
        self.lock_if_grounded(&mut record);
        record
    }

    fn lock_if_grounded(&self, record: &mut Record) {
        if !self.ground_mode {
            return;
        }
        if let Payload::GpsFix(fix) = &mut record.payload {
            if fix.is_good() && !fix.is_locked() {
                log::info!(
                    "ground mode: own position locked at {:.6}, {:.6}",
                    fix.position.latitude,
                    fix.position.longitude
                );
                fix.lock();
            }
        }
    }
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self::new(4, false)
    }
}
