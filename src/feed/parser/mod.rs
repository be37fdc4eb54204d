mod aprs;
mod gps;
mod sbs;
mod sensor;

use chrono::{DateTime, Utc};

use crate::config::{FeedProtocol, FuseConfig};
use crate::error::{FuseError, Result};
use crate::object::RecordKey;
use crate::store::Candidate;

pub use self::aprs::AprsParser;
pub use self::gps::GpsParser;
pub use self::sbs::SbsParser;
pub use self::sensor::SensorParser;

/// A parsed line, ready for [`Store::update`](crate::store::Store::update)
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub key: RecordKey,
    pub candidate: Candidate,
}

impl Update {
    pub fn new(candidate: Candidate) -> Self {
        Self {
            key: candidate.payload.key(),
            candidate,
        }
    }
}

/// Turns one line of a feed's wire protocol into a store update
pub trait Parser: Send + Sync {
    /// Parse `line`, resolving time-of-day fields against `now`
    fn unpack_at(&self, line: &str, priority: u32, now: DateTime<Utc>) -> Result<Update>;

    fn unpack(&self, line: &str, priority: u32) -> Result<Update> {
        self.unpack_at(line, priority, Utc::now())
    }
}

pub fn create_parser(protocol: FeedProtocol, config: &FuseConfig) -> Box<dyn Parser> {
    let max_height = config.filter.max_height();
    match protocol {
        FeedProtocol::Aprs => Box::new(AprsParser::new(max_height)),
        FeedProtocol::Sbs => Box::new(SbsParser::new(max_height)),
        FeedProtocol::Sensor => Box::new(SensorParser),
        FeedProtocol::Gps => Box::new(GpsParser),
    }
}

/// Parse a numeric field, naming it in the error
fn field<T: std::str::FromStr>(text: &str, name: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| FuseError::Unpack(format!("invalid {} '{}'", name, text)))
}

fn check_height(altitude: i32, max_height: Option<i32>) -> Result<()> {
    match max_height {
        Some(max) if altitude > max => Err(FuseError::Unpack(format!(
            "altitude {} m above filter {} m",
            altitude, max
        ))),
        _ => Ok(()),
    }
}
