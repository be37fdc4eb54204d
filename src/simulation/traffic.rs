use chrono::{DateTime, Utc};
use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::config::FeedProtocol;
use crate::constants::{FEET_2_M, FPM_2_MS, KTS_2_MS};
use crate::error::{FuseError, Result};
use crate::geo::double_to_int;
use crate::object::{AircraftType, IdType, Position};
use crate::processor::DegreeMinutes;

const METERS_PER_DEGREE: f64 = 111_195.0;

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub seed: Option<u64>,
    /// Center of the simulated airspace
    pub latitude: f64,
    pub longitude: f64,
    /// Aircraft reported over APRS only
    pub flarm_count: usize,
    /// Aircraft reported over SBS only
    pub transponder_count: usize,
    /// Aircraft reported by both feeds
    pub dual_count: usize,
    /// Initial spread around the center in meters
    pub radius_m: f64,
    /// Heading random walk per step in degrees
    pub heading_jitter_deg: f64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            seed: None,
            latitude: 49.665263,
            longitude: 9.003075,
            flarm_count: 3,
            transponder_count: 2,
            dual_count: 1,
            radius_m: 5000.0,
            heading_jitter_deg: 3.0,
        }
    }
}

impl TrafficConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn center(&self) -> Position {
        Position::new(self.latitude, self.longitude, 0)
    }
}

/// One wire line as a feed would deliver it
#[derive(Clone, Debug, PartialEq)]
pub struct FeedLine {
    pub protocol: FeedProtocol,
    pub line: String,
}

#[derive(Clone, Debug)]
struct SimAircraft {
    id: String,
    aircraft_type: AircraftType,
    latitude: f64,
    longitude: f64,
    /// Meters
    altitude: f64,
    heading: f64,
    /// Knots
    speed: f64,
    /// Feet per minute
    climb: f64,
    aprs: bool,
    sbs: bool,
}

impl SimAircraft {
    fn advance(&mut self, seconds: f64) {
        let distance = self.speed * KTS_2_MS * seconds;
        let heading = self.heading.to_radians();
        self.latitude += distance * heading.cos() / METERS_PER_DEGREE;
        self.longitude +=
            distance * heading.sin() / (METERS_PER_DEGREE * self.latitude.to_radians().cos());
        self.altitude = (self.altitude + self.climb * FPM_2_MS * seconds).max(0.0);
    }

    fn aprs_line(&self, now: DateTime<Utc>) -> String {
        let lat = DegreeMinutes::split(self.latitude, 2);
        let lon = DegreeMinutes::split(self.longitude, 2);
        let type_byte = (self.aircraft_type.as_raw() << 2) | IdType::Flarm.as_raw();
        format!(
            "FLR{id}>APRS,qAS,SIM:/{time}h{lat_d:02}{lat_m:05.2}{ns}/{lon_d:03}{lon_m:05.2}{ew}'{hdg:03}/{spd:03}/A={alt:06} id{ty:02X}{id} {fpm:+04}fpm +0.0rot",
            id = self.id,
            time = now.format("%H%M%S"),
            lat_d = lat.degrees,
            lat_m = lat.minutes,
            ns = if self.latitude < 0.0 { 'S' } else { 'N' },
            lon_d = lon.degrees,
            lon_m = lon.minutes,
            ew = if self.longitude < 0.0 { 'W' } else { 'E' },
            hdg = double_to_int(self.heading) % 360,
            spd = double_to_int(self.speed).clamp(0, 999),
            alt = double_to_int(self.altitude / FEET_2_M).clamp(0, 999_999),
            ty = type_byte,
            fpm = double_to_int(self.climb).clamp(-999, 999),
        )
    }

    fn sbs_line(&self, now: DateTime<Utc>) -> String {
        let date = now.format("%Y/%m/%d");
        let time = now.format("%H:%M:%S%.3f");
        format!(
            "MSG,3,1,1,{id},1,{date},{time},{date},{time},,{alt},,,{lat:.5},{lon:.5},,,0,0,0,0",
            id = self.id,
            alt = double_to_int(self.altitude / FEET_2_M),
            lat = self.latitude,
            lon = self.longitude,
        )
    }
}

/// Seeded synthetic traffic around a center position.
///
/// Every [`step`](Self::step) moves all aircraft and yields the APRS and
/// SBS lines the configured feeds would have delivered at that time.
pub struct TrafficSimulator {
    aircraft: Vec<SimAircraft>,
    rng: ChaCha8Rng,
    jitter: Normal<f64>,
}

impl TrafficSimulator {
    pub fn new(config: &TrafficConfig) -> Result<Self> {
        let jitter = Normal::new(0.0, config.heading_jitter_deg).map_err(|e| {
            FuseError::Config(format!(
                "invalid heading jitter {}: {}",
                config.heading_jitter_deg, e
            ))
        })?;
        let mut rng = create_rng(config.seed);

        let total = config.flarm_count + config.transponder_count + config.dual_count;
        let aircraft = (0..total)
            .map(|i| {
                let aprs = i < config.flarm_count || i >= config.flarm_count + config.transponder_count;
                let sbs = i >= config.flarm_count;
                spawn_aircraft(&mut rng, config, i, aprs, sbs)
            })
            .collect();

        Ok(Self {
            aircraft,
            rng,
            jitter,
        })
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    /// Ids of all simulated aircraft
    pub fn ids(&self) -> Vec<String> {
        self.aircraft.iter().map(|a| a.id.clone()).collect()
    }

    /// Advance by `seconds` and report at `now`
    pub fn step(&mut self, seconds: f64, now: DateTime<Utc>) -> Vec<FeedLine> {
        let mut lines = Vec::new();
        for aircraft in &mut self.aircraft {
            aircraft.heading = (aircraft.heading + self.jitter.sample(&mut self.rng)).rem_euclid(360.0);
            aircraft.advance(seconds);

            if aircraft.aprs {
                lines.push(FeedLine {
                    protocol: FeedProtocol::Aprs,
                    line: aircraft.aprs_line(now),
                });
            }
            if aircraft.sbs {
                lines.push(FeedLine {
                    protocol: FeedProtocol::Sbs,
                    line: aircraft.sbs_line(now),
                });
            }
        }
        lines
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

fn spawn_aircraft(
    rng: &mut ChaCha8Rng,
    config: &TrafficConfig,
    index: usize,
    aprs: bool,
    sbs: bool,
) -> SimAircraft {
    let bearing = rng.random::<f64>() * 360.0;
    let distance = rng.random::<f64>() * config.radius_m;
    let latitude = config.latitude + distance * bearing.to_radians().cos() / METERS_PER_DEGREE;
    let longitude = config.longitude
        + distance * bearing.to_radians().sin()
            / (METERS_PER_DEGREE * config.latitude.to_radians().cos());

    let aircraft_type = if aprs && !sbs {
        AircraftType::Glider
    } else {
        AircraftType::PoweredAircraft
    };

    SimAircraft {
        id: format!("{:06X}", 0xD00000 + index as u32),
        aircraft_type,
        latitude,
        longitude,
        altitude: 300.0 + rng.random::<f64>() * 2000.0,
        heading: rng.random::<f64>() * 360.0,
        speed: 40.0 + rng.random::<f64>() * 80.0,
        climb: (rng.random::<f64>() - 0.5) * 800.0,
        aprs,
        sbs,
    }
}
