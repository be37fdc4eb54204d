use crate::object::{Payload, PayloadKind, RecordKey, TargetKind, Timestamp};
use crate::processor::RenderBuffer;

/// A proposed update as produced by a feed parser
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub payload: Payload,
    /// Rank of the source, higher wins
    pub priority: u32,
    /// Time of report carried by the source
    pub time: Timestamp,
}

impl Candidate {
    pub fn new(payload: Payload, priority: u32, time: Timestamp) -> Self {
        Self {
            payload,
            priority,
            time,
        }
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    /// Target kind of an aircraft candidate
    pub fn target_kind(&self) -> Option<TargetKind> {
        self.payload.as_aircraft().map(|aircraft| aircraft.target_kind)
    }
}

/// The fused state held for one key
#[derive(Debug, Clone)]
pub struct Record {
    pub key: RecordKey,
    pub priority: u32,
    pub content_time: Timestamp,
    /// Ticks since the last accepted update
    pub age: u32,
    /// Set by an accepted update, cleared by the next tick
    pub touched: bool,
    pub payload: Payload,
    pub buffer: RenderBuffer,
}

impl Record {
    pub fn from_candidate(key: RecordKey, candidate: Candidate) -> Self {
        Self {
            key,
            priority: candidate.priority,
            content_time: candidate.time,
            age: 0,
            touched: true,
            payload: candidate.payload,
            buffer: RenderBuffer::new(),
        }
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn target_kind(&self) -> Option<TargetKind> {
        self.payload.as_aircraft().map(|aircraft| aircraft.target_kind)
    }

    /// Records that do not age: a locked own position, or the configured
    /// fallback fix standing in for a missing receiver
    pub fn is_pinned(&self) -> bool {
        matches!(&self.payload, Payload::GpsFix(fix) if fix.is_locked() || fix.is_fallback())
    }

    /// Drop an aircraft to transponder fidelity. Returns whether it changed.
    pub fn degrade(&mut self) -> bool {
        match &mut self.payload {
            Payload::Aircraft(aircraft) if aircraft.target_kind == TargetKind::Flarm => {
                aircraft.target_kind = TargetKind::Transponder;
                true
            }
            _ => false,
        }
    }
}
