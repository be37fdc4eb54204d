//! Great-circle distance and bearing on a spherical Earth.

use crate::constants::EARTH_RADIUS_M;
use crate::object::Position;

/// Distance and initial bearing from one point to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircle {
    /// Distance in meters
    pub distance_m: f64,
    /// Initial bearing in degrees, normalized to [0, 360)
    pub bearing_deg: f64,
}

impl GreatCircle {
    /// Bearing mapped into (-180, 180], as used by FLARM relative bearings
    pub fn signed_bearing(&self) -> f64 {
        if self.bearing_deg > 180.0 {
            self.bearing_deg - 360.0
        } else {
            self.bearing_deg
        }
    }

    /// Split into (north, east) offsets in meters
    pub fn offsets(&self) -> (f64, f64) {
        let bearing = self.bearing_deg.to_radians();
        (
            self.distance_m * bearing.cos(),
            self.distance_m * bearing.sin(),
        )
    }
}

/// Haversine distance and initial bearing between two (lat, lon) pairs
/// given in decimal degrees.
pub fn great_circle(from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> GreatCircle {
    let lat1 = from_lat.to_radians();
    let lat2 = to_lat.to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lon = (to_lon - from_lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` marginally outside [0, 1] for near-antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();
    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;

    GreatCircle {
        distance_m: EARTH_RADIUS_M * c,
        bearing_deg: bearing,
    }
}

/// [`great_circle`] between two positions, altitude ignored
pub fn distance_and_bearing(from: &Position, to: &Position) -> GreatCircle {
    great_circle(from.latitude, from.longitude, to.latitude, to.longitude)
}
