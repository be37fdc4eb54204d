//! NMEA sentences from a weather station: `MDA` (meteorological composite)
//! for the barometric pressure and `MWV` (wind) forwarded as is.

use chrono::{DateTime, Utc};

use crate::error::{FuseError, Result};
use crate::geo::verify_checksum;
use crate::object::{Atmosphere, Payload, Timestamp, Wind};
use crate::store::Candidate;

use super::{Parser, Update, field};

pub struct SensorParser;

impl SensorParser {
    /// Pressure in hPa from the bar field, which precedes the `B` unit field
    fn parse_pressure(fields: &[&str]) -> Result<f64> {
        let unit = fields
            .iter()
            .position(|f| *f == "B")
            .filter(|&i| i > 0)
            .ok_or_else(|| FuseError::Unpack("MDA sentence without bar field".into()))?;
        let bar: f64 = field(fields[unit - 1], "pressure")?;
        let pressure = bar * 1000.0;
        if pressure <= Atmosphere::MIN_PRESSURE || pressure >= Atmosphere::MAX_PRESSURE {
            return Err(FuseError::Unpack(format!(
                "implausible pressure {} hPa",
                pressure
            )));
        }
        Ok(pressure)
    }
}

impl Parser for SensorParser {
    fn unpack_at(&self, line: &str, priority: u32, now: DateTime<Utc>) -> Result<Update> {
        let sentence = line.trim_end();
        verify_checksum(sentence)?;

        let body = sentence
            .split('*')
            .next()
            .unwrap_or(sentence);
        let fields: Vec<&str> = body.split(',').collect();
        let payload = match fields[0] {
            tag if tag.ends_with("MDA") => Payload::Atmosphere(
                Atmosphere::new(Self::parse_pressure(&fields)?).with_sentence(sentence),
            ),
            tag if tag.ends_with("MWV") => Payload::Wind(Wind::new(sentence)),
            tag => {
                return Err(FuseError::Unpack(format!("unsupported sentence {}", tag)));
            }
        };

        Ok(Update::new(Candidate::new(
            payload,
            priority,
            Timestamp::new(now),
        )))
    }
}
