use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use std::fmt;

use crate::error::{FuseError, Result};

/// Time of report carried inside a payload.
///
/// Feeds usually only transmit a time of day. It is resolved against a
/// reference instant: today's date, or yesterday if the time of day would
/// lie more than an hour in the future (reports from just before midnight).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Resolve a time of day against `reference`
    pub fn from_time_of_day(time: NaiveTime, reference: DateTime<Utc>) -> Self {
        let candidate = reference.date_naive().and_time(time).and_utc();
        if candidate > reference + TimeDelta::hours(1) {
            Self(candidate - TimeDelta::days(1))
        } else {
            Self(candidate)
        }
    }

    /// Parse `hhmmss` (APRS, NMEA) relative to `reference`
    pub fn parse_hhmmss(text: &str, reference: DateTime<Utc>) -> Result<Self> {
        // NMEA allows a fractional part: 123519.00
        let whole = text.split('.').next().unwrap_or(text);
        let time = NaiveTime::parse_from_str(whole, "%H%M%S")
            .map_err(|e| FuseError::Unpack(format!("invalid time '{}': {}", text, e)))?;
        Ok(Self::from_time_of_day(time, reference))
    }

    /// Parse `hh:mm:ss.fff` (SBS-1) relative to `reference`
    pub fn parse_hms_colon(text: &str, reference: DateTime<Utc>) -> Result<Self> {
        let time = NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .map_err(|e| FuseError::Unpack(format!("invalid time '{}': {}", text, e)))?;
        Ok(Self::from_time_of_day(time, reference))
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}
