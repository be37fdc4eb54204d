/// A WGS84 position with altitude above mean sea level
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Latitude in decimal degrees, north positive
    pub latitude: f64,
    /// Longitude in decimal degrees, east positive
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: i32,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, altitude: i32) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Whether latitude and longitude are finite and within their ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_validity() {
        assert!(Position::new(49.665263, 9.003075, 110).is_valid());
        assert!(Position::new(-90.0, 180.0, 0).is_valid());
        assert!(!Position::new(91.0, 0.0, 0).is_valid());
        assert!(!Position::new(0.0, -180.5, 0).is_valid());
        assert!(!Position::new(f64::NAN, 0.0, 0).is_valid());
    }
}
