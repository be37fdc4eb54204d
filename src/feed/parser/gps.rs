//! `GPGGA` fixes from a gpsd NMEA stream, used as the own position.

use chrono::{DateTime, Utc};

use crate::error::{FuseError, Result};
use crate::geo::{dm_to_deg, double_to_int, verify_checksum};
use crate::object::{GpsFix, Payload, Position, Timestamp};
use crate::store::Candidate;

use super::{Parser, Update, field};

pub struct GpsParser;

impl GpsParser {
    fn coordinate(value: &str, hemisphere: &str, negative: &str, name: &str) -> Result<f64> {
        let degrees = dm_to_deg(field(value, name)?);
        Ok(if hemisphere == negative { -degrees } else { degrees })
    }
}

impl Parser for GpsParser {
    fn unpack_at(&self, line: &str, priority: u32, now: DateTime<Utc>) -> Result<Update> {
        let sentence = line.trim_end();
        if !sentence.starts_with("$GPGGA,") {
            return Err(FuseError::Unpack("not a GPGGA sentence".into()));
        }
        verify_checksum(sentence)?;

        let body = sentence.split('*').next().unwrap_or(sentence);
        let fields: Vec<&str> = body.split(',').collect();
        if fields.len() < 12 {
            return Err(FuseError::Unpack(format!(
                "GPGGA sentence has {} fields",
                fields.len()
            )));
        }

        let fix_quality: u8 = field(fields[6], "fix quality")?;
        if fix_quality == 0 {
            return Err(FuseError::Unpack("GPGGA without fix".into()));
        }

        let time = Timestamp::parse_hhmmss(fields[1], now)?;
        let latitude = Self::coordinate(fields[2], fields[3], "S", "latitude")?;
        let longitude = Self::coordinate(fields[4], fields[5], "W", "longitude")?;
        let satellites: u8 = field(fields[7], "satellites")?;
        let altitude: f64 = field(fields[9], "altitude")?;
        let geoid: f64 = field(fields[11], "geoid separation")?;

        let position = Position::new(latitude, longitude, double_to_int(altitude));
        if !position.is_valid() {
            return Err(FuseError::Unpack(format!("position out of range {:?}", position)));
        }

        Ok(Update::new(Candidate::new(
            Payload::GpsFix(GpsFix::new(position, fix_quality, satellites, geoid)),
            priority,
            time,
        )))
    }
}
