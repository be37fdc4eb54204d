use crate::constants::{
    FALLBACK_SATELLITES, GPS_GOOD_FIX_QUALITY, GPS_GOOD_SATELLITES, ICAO_STD_PRESSURE_HPA,
};

use super::Position;

/// Barometric reading
#[derive(Debug, Clone, PartialEq)]
pub struct Atmosphere {
    /// Pressure in hPa
    pub pressure: f64,
    /// Raw sentence it was decoded from, re-emitted verbatim
    pub sentence: Option<String>,
}

impl Atmosphere {
    pub const MIN_PRESSURE: f64 = 0.0;
    pub const MAX_PRESSURE: f64 = 2000.0;

    pub fn new(pressure: f64) -> Self {
        Self {
            pressure,
            sentence: None,
        }
    }

    pub fn with_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.sentence = Some(sentence.into());
        self
    }
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self::new(ICAO_STD_PRESSURE_HPA)
    }
}

/// Wind reading, forwarded as its raw sentence
#[derive(Debug, Clone, PartialEq)]
pub struct Wind {
    pub sentence: String,
}

impl Wind {
    pub fn new(sentence: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
        }
    }
}

/// Own-ship GPS fix
#[derive(Debug, Clone, PartialEq)]
pub struct GpsFix {
    pub position: Position,
    /// NMEA fix quality (0 = invalid, 1 = GPS, 2 = DGPS, ...)
    pub fix_quality: u8,
    pub satellites: u8,
    /// Geoid separation in meters
    pub geoid: f64,
    locked: bool,
    fallback: bool,
}

impl GpsFix {
    pub const MIN_GEOID: f64 = -214.0;
    pub const MAX_GEOID: f64 = 100.0;

    pub fn new(position: Position, fix_quality: u8, satellites: u8, geoid: f64) -> Self {
        Self {
            position,
            fix_quality,
            satellites,
            geoid,
            locked: false,
            fallback: false,
        }
    }

    /// Stand-in fix at a configured position, used until a receiver reports
    pub fn fallback(position: Position, geoid: f64) -> Self {
        Self {
            fallback: true,
            ..Self::new(position, GPS_GOOD_FIX_QUALITY, FALLBACK_SATELLITES, geoid)
        }
    }

    /// Whether the fix is good enough to pin a ground station's position
    pub fn is_good(&self) -> bool {
        self.fix_quality >= GPS_GOOD_FIX_QUALITY && self.satellites >= GPS_GOOD_SATELLITES
    }

    /// Locked fixes refuse all further updates
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}
