//! Configuration for the fusion service.
//!
//! Every section has sensible defaults, so a configuration file only needs
//! to list the feeds:
//!
//! ```
//! use vfrfuse::config::{FeedProtocol, FuseConfig};
//!
//! let config = FuseConfig::from_toml_str(
//!     r#"
//!     [fallback]
//!     latitude = 49.665263
//!     longitude = 9.003075
//!     altitude = 110
//!
//!     [[feeds]]
//!     name = "ogn"
//!     protocol = "aprs"
//!     host = "aprs.glidernet.org"
//!     port = 14580
//!     priority = 1
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.feeds[0].protocol, FeedProtocol::Aprs);
//! assert_eq!(config.general.server_port, 4353);
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::constants::ICAO_STD_PRESSURE_HPA;
use crate::error::{FuseError, Result};
use crate::object::Position;

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FuseConfig {
    /// Server and scheduling settings
    pub general: GeneralConfig,
    /// Observer position and pressure used until live data arrives
    pub fallback: FallbackConfig,
    /// Input and output filters
    pub filter: FilterConfig,
    /// Record aging and fusion knobs
    pub store: StoreConfig,
    /// Upstream feeds
    pub feeds: Vec<FeedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// TCP port subscribers connect to
    pub server_port: u16,
    /// Maximum number of simultaneous subscribers
    pub max_clients: usize,
    /// Period of the aging/render pass in milliseconds
    pub tick_interval_ms: u64,
    /// Lock the own position after the first good GPS fix
    pub ground_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: i32,
    /// Geoid separation in meters
    pub geoid: f64,
    /// Atmospheric pressure in hPa
    pub pressure: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Drop reports above this altitude in meters (negative: no limit)
    pub max_height: i32,
    /// Suppress output for targets farther away in meters (negative: no limit)
    pub max_distance: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Ticks without update after which an aircraft degrades to transponder fidelity
    pub no_flarm_threshold: u32,
    /// Ticks without update after which a record is deleted
    pub delete_threshold: u32,
    /// Ticks without update after which a lower priority source may take over
    pub reclaim_age: u32,
}

/// Wire protocol spoken by a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedProtocol {
    /// APRS-IS / OGN position reports (FLARM targets)
    Aprs,
    /// SBS-1 BaseStation messages (transponder targets)
    Sbs,
    /// NMEA sensor sentences (MDA pressure, MWV wind)
    Sensor,
    /// gpsd NMEA stream (own position)
    Gps,
}

/// A single upstream feed
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub protocol: FeedProtocol,
    pub host: String,
    pub port: u16,
    /// Higher priority sources win ties against lower ones
    #[serde(default)]
    pub priority: u32,
    /// APRS-IS login line, sent after connecting
    #[serde(default)]
    pub login: Option<String>,
}

impl FuseConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feeds.is_empty() {
            return Err(FuseError::Config("no feeds configured".into()));
        }

        let mut names = HashSet::new();
        for feed in &self.feeds {
            if feed.name.trim().is_empty() {
                return Err(FuseError::Config("feed with empty name".into()));
            }
            if !names.insert(feed.name.as_str()) {
                return Err(FuseError::Config(format!(
                    "duplicate feed name: {}",
                    feed.name
                )));
            }
            if feed.host.trim().is_empty() {
                return Err(FuseError::Config(format!("feed {} has no host", feed.name)));
            }
        }

        if !self.fallback.position().is_valid() {
            return Err(FuseError::Config(format!(
                "fallback position out of range: {}, {}",
                self.fallback.latitude, self.fallback.longitude
            )));
        }

        // Age is still 0 on the first render after an update
        if self.store.no_flarm_threshold == 0 {
            return Err(FuseError::Config("no_flarm_threshold must be at least 1".into()));
        }

        if self.store.delete_threshold <= self.store.no_flarm_threshold {
            return Err(FuseError::Config(format!(
                "delete_threshold ({}) must exceed no_flarm_threshold ({})",
                self.store.delete_threshold, self.store.no_flarm_threshold
            )));
        }

        if self.general.tick_interval_ms == 0 {
            return Err(FuseError::Config("tick_interval_ms must be positive".into()));
        }

        Ok(())
    }
}

impl GeneralConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl FallbackConfig {
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude, self.altitude)
    }
}

impl FilterConfig {
    pub fn max_height(&self) -> Option<i32> {
        (self.max_height >= 0).then_some(self.max_height)
    }

    pub fn max_distance(&self) -> Option<i32> {
        (self.max_distance >= 0).then_some(self.max_distance)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            server_port: 4353,
            max_clients: 5,
            tick_interval_ms: 1000,
            ground_mode: false,
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0,
            geoid: 0.0,
            pressure: ICAO_STD_PRESSURE_HPA,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_height: -1,
            max_distance: -1,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            no_flarm_threshold: 4,
            delete_threshold: 120,
            reclaim_age: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [general]
        server_port = 1234
        ground_mode = true

        [fallback]
        latitude = 77.777777
        longitude = -12.121212
        altitude = 1234
        geoid = 40.4
        pressure = 999.9

        [filter]
        max_height = -1
        max_distance = 10000

        [store]
        no_flarm_threshold = 3

        [[feeds]]
        name = "sens1"
        protocol = "sensor"
        host = "localhost"
        port = 3456
        priority = 1
    "#;

    #[test]
    fn test_full_config() {
        let config = FuseConfig::from_toml_str(FULL).unwrap();
        assert_eq!(config.general.server_port, 1234);
        assert!(config.general.ground_mode);
        assert_eq!(config.general.max_clients, 5);
        assert!((config.fallback.latitude - 77.777777).abs() < 1e-9);
        assert!((config.fallback.longitude + 12.121212).abs() < 1e-9);
        assert_eq!(config.fallback.altitude, 1234);
        assert!((config.fallback.geoid - 40.4).abs() < 1e-9);
        assert!((config.fallback.pressure - 999.9).abs() < 1e-9);
        assert_eq!(config.filter.max_height(), None);
        assert_eq!(config.filter.max_distance(), Some(10000));
        assert_eq!(config.store.no_flarm_threshold, 3);
        assert_eq!(config.store.delete_threshold, 120);

        let feed = &config.feeds[0];
        assert_eq!(feed.name, "sens1");
        assert_eq!(feed.protocol, FeedProtocol::Sensor);
        assert_eq!(feed.priority, 1);
        assert!(feed.login.is_none());
    }

    #[test]
    fn test_no_feeds_rejected() {
        let err = FuseConfig::from_toml_str("[general]\nserver_port = 1\n").unwrap_err();
        assert!(matches!(err, FuseError::Config(_)));
    }

    #[test]
    fn test_duplicate_feed_names_rejected() {
        let text = r#"
            [[feeds]]
            name = "a"
            protocol = "sbs"
            host = "127.0.0.1"
            port = 30003

            [[feeds]]
            name = "a"
            protocol = "aprs"
            host = "127.0.0.1"
            port = 14580
        "#;
        assert!(FuseConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn test_unknown_protocol_rejected() {
        let text = r#"
            [[feeds]]
            name = "x"
            protocol = "carrier-pigeon"
            host = "127.0.0.1"
            port = 1
        "#;
        assert!(matches!(
            FuseConfig::from_toml_str(text),
            Err(FuseError::Toml(_))
        ));
    }

    #[test]
    fn test_thresholds_validated() {
        let mut config = FuseConfig::from_toml_str(FULL).unwrap();
        config.store.delete_threshold = config.store.no_flarm_threshold;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_no_flarm_threshold_rejected() {
        let mut config = FuseConfig::from_toml_str(FULL).unwrap();
        config.store.no_flarm_threshold = 0;
        assert!(matches!(config.validate(), Err(FuseError::Config(_))));
        config.store.no_flarm_threshold = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fallback_range_validated() {
        let mut config = FuseConfig::from_toml_str(FULL).unwrap();
        config.fallback.latitude = 95.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = FuseConfig::default();
        assert_eq!(config.general.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.store.reclaim_age, 4);
        assert_eq!(config.filter.max_height(), None);
        assert_eq!(config.filter.max_distance(), None);
    }
}
