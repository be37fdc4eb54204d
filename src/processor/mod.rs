//! Rendering of fused records into output sentences.
//!
//! Each payload kind has a processor that writes its sentences into the
//! record's [`RenderBuffer`]. Rendering is relative to an
//! [`ObserverContext`], the own position and pressure snapshot taken at the
//! start of a tick.

pub mod aircraft;
pub mod buffer;
pub mod gps;

use chrono::{DateTime, Utc};

use crate::constants::ICAO_STD_PRESSURE_HPA;
use crate::error::Result;
use crate::object::{Payload, Position};

pub use aircraft::{AircraftProcessor, RelativePosition};
pub use buffer::RenderBuffer;
pub use gps::{DegreeMinutes, GpsProcessor};

/// Observer state relative rendering is computed against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverContext {
    pub position: Position,
    /// Atmospheric pressure in hPa
    pub pressure: f64,
}

impl ObserverContext {
    pub fn new(position: Position, pressure: f64) -> Self {
        Self { position, pressure }
    }
}

impl Default for ObserverContext {
    fn default() -> Self {
        Self::new(Position::default(), ICAO_STD_PRESSURE_HPA)
    }
}

/// Dispatches a payload to the processor for its kind
pub struct Processor {
    aircraft: AircraftProcessor,
    gps: GpsProcessor,
}

impl Processor {
    pub fn new(max_distance: Option<i32>) -> Self {
        Self {
            aircraft: AircraftProcessor::new(max_distance),
            gps: GpsProcessor,
        }
    }

    /// Render `payload` into `buf`, replacing its previous content.
    ///
    /// `now` stamps the GPS sentences. An empty buffer after `Ok` means the
    /// payload has nothing to say this tick.
    pub fn render(
        &self,
        payload: &Payload,
        ctx: &ObserverContext,
        now: DateTime<Utc>,
        buf: &mut RenderBuffer,
    ) -> Result<()> {
        match payload {
            Payload::Aircraft(aircraft) => self.aircraft.process(aircraft, ctx, buf),
            Payload::GpsFix(fix) => self.gps.process(fix, now, buf),
            Payload::Atmosphere(atmosphere) => {
                buf.clear();
                if let Some(sentence) = &atmosphere.sentence {
                    buf.append_raw(sentence);
                }
                Ok(())
            }
            Payload::Wind(wind) => {
                buf.clear();
                buf.append_raw(&wind.sentence);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Aircraft, Atmosphere, GpsFix, Wind};

    #[test]
    fn test_dispatch_sensor_payloads() {
        let processor = Processor::new(None);
        let ctx = ObserverContext::default();
        let mut buf = RenderBuffer::new();

        let wind = Payload::Wind(Wind::new("$WIMWV,242.8,R,6.9,N,A*20"));
        processor.render(&wind, &ctx, Utc::now(), &mut buf).unwrap();
        assert_eq!(buf.as_bytes(), b"$WIMWV,242.8,R,6.9,N,A*20\r\n");

        let atm = Payload::Atmosphere(Atmosphere::new(1009.0));
        processor.render(&atm, &ctx, Utc::now(), &mut buf).unwrap();
        assert!(buf.is_empty());

        let atm = Payload::Atmosphere(
            Atmosphere::new(1009.0).with_sentence("$WIMDA,29.7987,I,1.0091,B,14.8,C,,,,,,,,,,,,,,*3E\r\n"),
        );
        processor.render(&atm, &ctx, Utc::now(), &mut buf).unwrap();
        assert!(buf.as_bytes().starts_with(b"$WIMDA,"));
        assert!(buf.as_bytes().ends_with(b"*3E\r\n"));
    }

    #[test]
    fn test_dispatch_aircraft_and_gps() {
        let processor = Processor::new(None);
        let ctx = ObserverContext::new(Position::new(49.0, 9.0, 100), 1013.25);
        let mut buf = RenderBuffer::new();

        let ac = Payload::Aircraft(Aircraft::new("AB12CD", Position::new(49.01, 9.0, 600)));
        processor.render(&ac, &ctx, Utc::now(), &mut buf).unwrap();
        assert!(buf.as_bytes().starts_with(b"$PFLAU,"));

        let gps = Payload::GpsFix(GpsFix::new(Position::new(49.0, 9.0, 100), 1, 9, 48.0));
        processor.render(&gps, &ctx, Utc::now(), &mut buf).unwrap();
        assert!(buf.as_bytes().starts_with(b"$GPRMC,"));
    }
}
