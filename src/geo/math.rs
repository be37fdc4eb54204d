use crate::constants::ICAO_STD_PRESSURE_HPA;

/// Convert degrees to radians
pub fn radian(degree: f64) -> f64 {
    degree.to_radians()
}

/// Convert radians to degrees
pub fn degree(radian: f64) -> f64 {
    radian.to_degrees()
}

/// Round to the nearest integer, halves away from zero.
///
/// Out of range values saturate at the `i32` bounds, NaN maps to 0.
pub fn double_to_int(value: f64) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

/// Convert a `dddmm.mmm` degree-minute value into decimal degrees.
///
/// The sign is dropped; callers apply the hemisphere themselves.
pub fn dm_to_deg(deg_min: f64) -> f64 {
    let abs_dm = (deg_min / 100.0).abs();
    let degrees = abs_dm.floor();
    let minutes = (abs_dm - degrees) * 100.0 / 60.0;
    degrees + minutes
}

/// Clamp `value` into `[min, max]`
pub fn saturate<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Height in meters of the given pressure level above the standard
/// pressure level (1013.25 hPa), using the ICAO standard atmosphere.
pub fn icao_height(pressure_hpa: f64) -> i32 {
    double_to_int(
        288.15 * (1.0 - (pressure_hpa / ICAO_STD_PRESSURE_HPA).powf(0.190295)) / 0.0065,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_radian_degree() {
        assert!((radian(180.0) - PI).abs() < 1e-12);
        assert!((degree(PI / 2.0) - 90.0).abs() < 1e-12);
        assert!((degree(radian(49.665263)) - 49.665263).abs() < 1e-9);
    }

    #[test]
    fn test_double_to_int_rounds_half_away_from_zero() {
        assert_eq!(double_to_int(0.5), 1);
        assert_eq!(double_to_int(0.49), 0);
        assert_eq!(double_to_int(-0.5), -1);
        assert_eq!(double_to_int(-0.49), 0);
        assert_eq!(double_to_int(2.5), 3);
        assert_eq!(double_to_int(-2.5), -3);
    }

    #[test]
    fn test_double_to_int_saturates() {
        assert_eq!(double_to_int(1e12), i32::MAX);
        assert_eq!(double_to_int(-1e12), i32::MIN);
        assert_eq!(double_to_int(f64::NAN), 0);
    }

    #[test]
    fn test_dm_to_deg() {
        // 49°39.92' = 49.665333°
        assert!((dm_to_deg(4939.92) - 49.665333).abs() < 1e-5);
        assert!((dm_to_deg(900.18) - 9.003).abs() < 1e-6);
        // Sign is ignored
        assert!((dm_to_deg(-4939.92) - 49.665333).abs() < 1e-5);
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate(5, 0, 10), 5);
        assert_eq!(saturate(-5, 0, 10), 0);
        assert_eq!(saturate(15, 0, 10), 10);
        assert!((saturate::<f64>(40.0, -32.8, 32.8) - 32.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_icao_height() {
        assert_eq!(icao_height(1013.25), 0);
        // ~111 m per 13.25 hPa near sea level
        let h = icao_height(1000.0);
        assert!((105..=115).contains(&h), "got {}", h);
        // Higher pressure means a level below standard
        assert!(icao_height(1030.0) < 0);
    }
}
