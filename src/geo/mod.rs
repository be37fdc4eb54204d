pub mod geodesic;
pub mod math;
pub mod nmea;

pub use geodesic::{GreatCircle, distance_and_bearing, great_circle};
pub use math::{degree, dm_to_deg, double_to_int, icao_height, radian, saturate};
pub use nmea::{checksum, verify_checksum};
