//! APRS-IS position reports as sent by the OGN network.
//!
//! ```text
//! FLRDDA5BA>APRS,qAS,LFMX:/160829h4415.41N/00600.03E'342/049/A=005524 id0ADDA5BA -454fpm -1.1rot
//! ```
//!
//! The `idXXYYYYYY` token carries the id type (bits 0-1) and aircraft type
//! (bits 2-6) in `XX` and the 24 bit address in `YYYYYY`.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};

use crate::constants::{FEET_2_M, FPM_2_MS, KTS_2_MS};
use crate::error::{FuseError, Result};
use crate::geo::{dm_to_deg, double_to_int};
use crate::object::{
    Aircraft, AircraftType, IdType, Movement, Payload, Position, TargetKind, Timestamp,
};
use crate::store::Candidate;

use super::{Parser, Update, check_height, field};

fn position_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^\S+?>APRS,\S+?(?:,\S+?)?:/(\d{6})h(\d{4}\.\d{2})([NS])[\S\s]+?",
            r"(\d{5}\.\d{2})([EW])[\S\s]+?(?:(\d{3})/(\d{3}))?/A=(\d{6})\s+?([\S\s]+?)$"
        ))
        .expect("valid APRS position regex")
    })
}

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)id([0-9A-F]{2})([0-9A-F]{6})\s?(?:([+-]\d{3})fpm\s+?)?(?:([+-]\d+?\.\d+?)rot)?")
            .expect("valid APRS comment regex")
    })
}

pub struct AprsParser {
    max_height: Option<i32>,
}

impl AprsParser {
    pub fn new(max_height: Option<i32>) -> Self {
        Self { max_height }
    }

    fn parse_position(&self, caps: &Captures<'_>) -> Result<Position> {
        let mut latitude = dm_to_deg(field(&caps[2], "latitude")?);
        if caps[3].eq_ignore_ascii_case("S") {
            latitude = -latitude;
        }
        let mut longitude = dm_to_deg(field(&caps[4], "longitude")?);
        if caps[5].eq_ignore_ascii_case("W") {
            longitude = -longitude;
        }
        let feet: f64 = field(&caps[8], "altitude")?;
        let altitude = double_to_int(feet * FEET_2_M);
        check_height(altitude, self.max_height)?;

        Ok(Position::new(latitude, longitude, altitude))
    }

    /// Heading, speed and climb rate; `None` unless all three are present
    fn parse_movement(caps: &Captures<'_>, comment: &Captures<'_>) -> Option<Movement> {
        let heading: f64 = caps.get(6)?.as_str().parse().ok()?;
        let knots: f64 = caps.get(7)?.as_str().parse().ok()?;
        let fpm: f64 = comment.get(3)?.as_str().parse().ok()?;
        Some(Movement {
            heading,
            gnd_speed: knots * KTS_2_MS,
            climb_rate: fpm * FPM_2_MS,
        })
    }
}

impl Parser for AprsParser {
    fn unpack_at(&self, line: &str, priority: u32, now: DateTime<Utc>) -> Result<Update> {
        let line = line.trim_end();
        if line.starts_with('#') {
            return Err(FuseError::Unpack("server comment".into()));
        }

        let caps = position_pattern()
            .captures(line)
            .ok_or_else(|| FuseError::Unpack("not an APRS position report".into()))?;
        let position = self.parse_position(&caps)?;
        let time = Timestamp::parse_hhmmss(&caps[1], now)?;

        let comment = comment_pattern()
            .captures(&caps[9])
            .ok_or_else(|| FuseError::Unpack("APRS comment without id".into()))?;
        let type_byte = u8::from_str_radix(&comment[1], 16)
            .map_err(|e| FuseError::Unpack(format!("invalid id type '{}': {}", &comment[1], e)))?;

        let mut aircraft = Aircraft::new(comment[2].to_ascii_uppercase(), position)
            .with_target_kind(TargetKind::Flarm)
            .with_types(
                IdType::from_raw(type_byte & 0x03),
                AircraftType::from_raw((type_byte & 0x7C) >> 2),
            );
        if let Some(movement) = Self::parse_movement(&caps, &comment) {
            aircraft = aircraft.with_movement(movement);
        }

        Ok(Update::new(Candidate::new(
            Payload::Aircraft(aircraft),
            priority,
            time,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::RecordKey;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    const REPORT: &str = "FLRDDA5BA>APRS,qAS,LFMX:/160829h4415.41N/00600.03E'342/049/A=005524 id0ADDA5BA -454fpm -1.1rot 8.8dB 0e +51.2kHz gps4x5";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 5, 16, 10, 0).unwrap()
    }

    fn aircraft(update: &Update) -> &Aircraft {
        update.candidate.payload.as_aircraft().unwrap()
    }

    #[test]
    fn test_full_report() {
        let update = AprsParser::new(None).unpack_at(REPORT, 2, now()).unwrap();
        assert_eq!(update.key, RecordKey::from_id("DDA5BA"));
        assert_eq!(update.candidate.priority, 2);
        assert_eq!(
            update.candidate.time,
            Timestamp::new(Utc.with_ymd_and_hms(2024, 6, 5, 16, 8, 29).unwrap())
        );

        let ac = aircraft(&update);
        assert_eq!(ac.id, "DDA5BA");
        assert_eq!(ac.id_type, IdType::Flarm);
        assert_eq!(ac.aircraft_type, AircraftType::TowPlane);
        assert_eq!(ac.target_kind, TargetKind::Flarm);
        assert_abs_diff_eq!(ac.position.latitude, 44.256833, epsilon = 1e-5);
        assert_abs_diff_eq!(ac.position.longitude, 6.0005, epsilon = 1e-5);
        assert_eq!(ac.position.altitude, 1684);

        let movement = ac.movement.unwrap();
        assert_abs_diff_eq!(movement.heading, 342.0);
        assert_abs_diff_eq!(movement.gnd_speed, 49.0 * KTS_2_MS, epsilon = 1e-9);
        assert_abs_diff_eq!(movement.climb_rate, -454.0 * FPM_2_MS, epsilon = 1e-9);
    }

    #[test]
    fn test_southern_western_hemisphere() {
        let line = "ICA3D1C35>APRS,qAS,Padova:/094220h4552.41S/01205.03W^000/000/A=000086 !W65! id053D1C35 +000fpm +0.0rot";
        let update = AprsParser::new(None).unpack_at(line, 0, now()).unwrap();
        let ac = aircraft(&update);
        assert!(ac.position.latitude < 0.0);
        assert!(ac.position.longitude < 0.0);
        assert_eq!(ac.id_type, IdType::Icao);
        assert_eq!(ac.aircraft_type, AircraftType::Glider);
    }

    #[test]
    fn test_missing_movement() {
        let line = "FLRDDA5BA>APRS,qAS,LFMX:/160829h4415.41N/00600.03E'/A=005524 id0ADDA5BA";
        let update = AprsParser::new(None).unpack_at(line, 0, now()).unwrap();
        assert!(aircraft(&update).movement.is_none());
    }

    #[test]
    fn test_server_comment_ignored() {
        let parser = AprsParser::new(None);
        assert!(parser.unpack_at("# aprsc 2.1.4-g408ed49", 0, now()).is_err());
        assert!(parser.unpack_at("garbage", 0, now()).is_err());
    }

    #[test]
    fn test_max_height_filter() {
        assert!(AprsParser::new(Some(1000)).unpack_at(REPORT, 0, now()).is_err());
        assert!(AprsParser::new(Some(2000)).unpack_at(REPORT, 0, now()).is_ok());
    }

    #[test]
    fn test_without_id_rejected() {
        let line = "FLRDDA5BA>APRS,qAS,LFMX:/160829h4415.41N/00600.03E'342/049/A=005524 no id here";
        assert!(AprsParser::new(None).unpack_at(line, 0, now()).is_err());
    }
}
