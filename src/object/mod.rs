//! Domain values carried by feeds and stored in records.

pub mod aircraft;
pub mod position;
pub mod sensor;
pub mod timestamp;

use std::fmt;

pub use aircraft::{Aircraft, AircraftType, IdType, Movement, TargetKind};
pub use position::Position;
pub use sensor::{Atmosphere, GpsFix, Wind};
pub use timestamp::Timestamp;

/// Store key, derived from a payload's stable identifier.
///
/// FNV-1a over the identifier bytes, so keys are identical across runs
/// and builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(u64);

impl RecordKey {
    pub const ATMOSPHERE: RecordKey = RecordKey::from_id("@atmosphere");
    pub const WIND: RecordKey = RecordKey::from_id("@wind");
    pub const GPS: RecordKey = RecordKey::from_id("@gps");

    pub const fn from_id(id: &str) -> Self {
        let bytes = id.as_bytes();
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            i += 1;
        }
        Self(hash)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Discriminant of a [`Payload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Aircraft,
    Atmosphere,
    Wind,
    GpsFix,
}

/// The fused value held by a record
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Aircraft(Aircraft),
    Atmosphere(Atmosphere),
    Wind(Wind),
    GpsFix(GpsFix),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Aircraft(_) => PayloadKind::Aircraft,
            Self::Atmosphere(_) => PayloadKind::Atmosphere,
            Self::Wind(_) => PayloadKind::Wind,
            Self::GpsFix(_) => PayloadKind::GpsFix,
        }
    }

    /// Key of the record this payload belongs to
    pub fn key(&self) -> RecordKey {
        match self {
            Self::Aircraft(aircraft) => RecordKey::from_id(&aircraft.id),
            Self::Atmosphere(_) => RecordKey::ATMOSPHERE,
            Self::Wind(_) => RecordKey::WIND,
            Self::GpsFix(_) => RecordKey::GPS,
        }
    }

    pub fn as_aircraft(&self) -> Option<&Aircraft> {
        match self {
            Self::Aircraft(aircraft) => Some(aircraft),
            _ => None,
        }
    }
}
