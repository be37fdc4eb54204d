//! Physical constants and unit conversion factors
//!
//! Shared by the geodesic math, the feed parsers and the sentence
//! processors. Speeds are stored internally in m/s, vertical rates in m/s
//! and altitudes in meters.

/// Mean Earth radius in meters used for great-circle calculations.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// ICAO standard atmospheric pressure at mean sea level in hPa.
pub const ICAO_STD_PRESSURE_HPA: f64 = 1013.25;

/// Knots to meters per second.
pub const KTS_2_MS: f64 = 0.514444;

/// Meters per second to kilometers per hour.
pub const MS_2_KMH: f64 = 3.6;

/// Feet per minute to meters per second.
pub const FPM_2_MS: f64 = 0.00508;

/// Feet to meters.
pub const FEET_2_M: f64 = 0.3048;

/// Capacity in bytes of every record's render buffer.
/// Large enough for one PFLAU + PFLAA pair or one GPRMC + GPGGA pair.
pub const RENDER_CAPACITY: usize = 192;

/// Minimum number of satellites for a GPS fix to count as good.
pub const GPS_GOOD_SATELLITES: u8 = 7;

/// Minimum NMEA fix quality for a GPS fix to count as good.
pub const GPS_GOOD_FIX_QUALITY: u8 = 1;

/// Satellite count reported for the configured fallback position.
/// Below [`GPS_GOOD_SATELLITES`], so ground mode never locks onto it.
pub const FALLBACK_SATELLITES: u8 = 1;
