//! SBS-1 BaseStation messages from an ADS-B decoder (dump1090 port 30003).
//!
//! Only airborne position messages (`MSG,3`) are used. Fields by index:
//! 4 address, 7 time generated, 11 altitude (ft), 14 latitude, 15 longitude.

use chrono::{DateTime, Utc};

use crate::constants::FEET_2_M;
use crate::error::{FuseError, Result};
use crate::geo::double_to_int;
use crate::object::{Aircraft, AircraftType, IdType, Payload, Position, TargetKind, Timestamp};
use crate::store::Candidate;

use super::{Parser, Update, check_height, field};

const FIELD_ID: usize = 4;
const FIELD_TIME: usize = 7;
const FIELD_ALTITUDE: usize = 11;
const FIELD_LATITUDE: usize = 14;
const FIELD_LONGITUDE: usize = 15;

pub struct SbsParser {
    max_height: Option<i32>,
}

impl SbsParser {
    pub fn new(max_height: Option<i32>) -> Self {
        Self { max_height }
    }
}

impl Parser for SbsParser {
    fn unpack_at(&self, line: &str, priority: u32, now: DateTime<Utc>) -> Result<Update> {
        if !line.starts_with("MSG,3,") {
            return Err(FuseError::Unpack("not an SBS position message".into()));
        }

        let fields: Vec<&str> = line.trim_end().split(',').collect();
        if fields.len() <= FIELD_LONGITUDE {
            return Err(FuseError::Unpack(format!(
                "SBS message has {} fields",
                fields.len()
            )));
        }

        let id = fields[FIELD_ID].trim();
        if id.is_empty() {
            return Err(FuseError::Unpack("SBS message without address".into()));
        }
        let time = Timestamp::parse_hms_colon(fields[FIELD_TIME], now)?;

        let feet: f64 = field(fields[FIELD_ALTITUDE], "altitude")?;
        let altitude = double_to_int(feet * FEET_2_M);
        check_height(altitude, self.max_height)?;

        let position = Position::new(
            field(fields[FIELD_LATITUDE], "latitude")?,
            field(fields[FIELD_LONGITUDE], "longitude")?,
            altitude,
        );
        if !position.is_valid() {
            return Err(FuseError::Unpack(format!("position out of range {:?}", position)));
        }

        let aircraft = Aircraft::new(id.to_ascii_uppercase(), position)
            .with_target_kind(TargetKind::Transponder)
            .with_types(IdType::Icao, AircraftType::default());

        Ok(Update::new(Candidate::new(
            Payload::Aircraft(aircraft),
            priority,
            time,
        )))
    }
}
