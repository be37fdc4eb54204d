//! Own position sentences (GPRMC, GPGGA) for the GPS record.

use chrono::{DateTime, Utc};

use crate::error::{FuseError, Result};
use crate::geo::saturate;
use crate::object::GpsFix;

use super::RenderBuffer;

/// A coordinate split into whole degrees and decimal minutes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeMinutes {
    pub degrees: u32,
    pub minutes: f64,
}

impl DegreeMinutes {
    /// Split `value` (sign dropped), with minutes rounded to `decimals`.
    ///
    /// Rounding that reaches 60 minutes carries into the degrees.
    pub fn split(value: f64, decimals: i32) -> Self {
        let abs = value.abs();
        let mut degrees = abs.floor();
        let scale = 10f64.powi(decimals);
        let mut minutes = ((abs - degrees) * 60.0 * scale).round() / scale;
        if minutes >= 60.0 {
            degrees += 1.0;
            minutes -= 60.0;
        }
        Self {
            degrees: degrees as u32,
            minutes,
        }
    }
}

fn north_south(latitude: f64) -> char {
    if latitude < 0.0 { 'S' } else { 'N' }
}

fn east_west(longitude: f64) -> char {
    if longitude < 0.0 { 'W' } else { 'E' }
}

pub struct GpsProcessor;

impl GpsProcessor {
    pub fn process(&self, fix: &GpsFix, now: DateTime<Utc>, buf: &mut RenderBuffer) -> Result<()> {
        buf.clear();

        if !fix.position.is_valid() {
            return Err(FuseError::Render(format!(
                "gps fix has invalid position {:?}",
                fix.position
            )));
        }

        if self.append_gprmc(fix, now, buf) {
            self.append_gpgga(fix, now, buf);
        }
        Ok(())
    }

    fn append_gprmc(&self, fix: &GpsFix, now: DateTime<Utc>, buf: &mut RenderBuffer) -> bool {
        let lat = DegreeMinutes::split(fix.position.latitude, 3);
        let lon = DegreeMinutes::split(fix.position.longitude, 3);
        buf.append_sentence(format_args!(
            "GPRMC,{},A,{:02}{:06.3},{},{:03}{:06.3},{},0,0,{},001.0,W",
            now.format("%H%M%S"),
            lat.degrees,
            lat.minutes,
            north_south(fix.position.latitude),
            lon.degrees,
            lon.minutes,
            east_west(fix.position.longitude),
            now.format("%d%m%y")
        ))
    }

    fn append_gpgga(&self, fix: &GpsFix, now: DateTime<Utc>, buf: &mut RenderBuffer) -> bool {
        let lat = DegreeMinutes::split(fix.position.latitude, 4);
        let lon = DegreeMinutes::split(fix.position.longitude, 4);
        buf.append_sentence(format_args!(
            "GPGGA,{},{:02}{:07.4},{},{:03}{:07.4},{},{},{:02},1,{},M,{:.1},M,,",
            now.format("%H%M%S"),
            lat.degrees,
            lat.minutes,
            north_south(fix.position.latitude),
            lon.degrees,
            lon.minutes,
            east_west(fix.position.longitude),
            fix.fix_quality,
            fix.satellites,
            fix.position.altitude,
            saturate(fix.geoid, GpsFix::MIN_GEOID, GpsFix::MAX_GEOID)
        ))
    }
}
