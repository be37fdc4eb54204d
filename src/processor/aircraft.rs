//! FLARM traffic sentences for aircraft records.
//!
//! Each aircraft in range yields a PFLAU (traffic status) sentence followed
//! by a PFLAA (traffic report) sentence, both relative to the observer.

use crate::constants::MS_2_KMH;
use crate::error::{FuseError, Result};
use crate::geo::{distance_and_bearing, double_to_int, icao_height, saturate};
use crate::object::{Aircraft, Movement, TargetKind};

use super::{ObserverContext, RenderBuffer};

/// Observer relative geometry of a target, integer rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativePosition {
    /// Distance in meters
    pub distance: i32,
    /// Bearing in degrees, (-180, 180]
    pub bearing: i32,
    /// Offset to the north in meters
    pub north: i32,
    /// Offset to the east in meters
    pub east: i32,
    /// Height above the observer in meters
    pub vertical: i32,
}

impl RelativePosition {
    pub fn compute(aircraft: &Aircraft, ctx: &ObserverContext) -> Self {
        let gc = distance_and_bearing(&ctx.position, &aircraft.position);
        let (north, east) = gc.offsets();
        let distance = double_to_int(gc.distance_m);

        // Transponder altitudes are pressure altitudes referenced to 1013.25 hPa
        let vertical = match aircraft.target_kind {
            TargetKind::Transponder => aircraft
                .position
                .altitude
                .saturating_sub(icao_height(ctx.pressure)),
            TargetKind::Flarm => aircraft
                .position
                .altitude
                .saturating_sub(ctx.position.altitude),
        };

        Self {
            distance,
            bearing: double_to_int(gc.signed_bearing()),
            north: double_to_int(north),
            east: double_to_int(east),
            vertical,
        }
    }
}

pub struct AircraftProcessor {
    max_distance: Option<i32>,
}

impl AircraftProcessor {
    /// `max_distance` in meters, `None` for unlimited range
    pub fn new(max_distance: Option<i32>) -> Self {
        Self { max_distance }
    }

    pub fn process(
        &self,
        aircraft: &Aircraft,
        ctx: &ObserverContext,
        buf: &mut RenderBuffer,
    ) -> Result<()> {
        buf.clear();

        if aircraft.id.is_empty() {
            return Err(FuseError::Render("aircraft without id".into()));
        }
        if !aircraft.position.is_valid() {
            return Err(FuseError::Render(format!(
                "aircraft {} has invalid position {:?}",
                aircraft.id, aircraft.position
            )));
        }
        if !ctx.position.is_valid() || !ctx.pressure.is_finite() {
            return Err(FuseError::Render(format!(
                "invalid observer context {:?}",
                ctx
            )));
        }

        let rel = RelativePosition::compute(aircraft, ctx);
        if self.max_distance.is_some_and(|max| rel.distance > max) {
            return Ok(());
        }

        if self.append_pflau(aircraft, &rel, buf) {
            self.append_pflaa(aircraft, &rel, buf);
        }
        Ok(())
    }

    fn append_pflau(&self, aircraft: &Aircraft, rel: &RelativePosition, buf: &mut RenderBuffer) -> bool {
        buf.append_sentence(format_args!(
            "PFLAU,,,,1,0,{},0,{},{},{}",
            rel.bearing, rel.vertical, rel.distance, aircraft.id
        ))
    }

    fn append_pflaa(&self, aircraft: &Aircraft, rel: &RelativePosition, buf: &mut RenderBuffer) -> bool {
        match aircraft.movement {
            Some(movement) => {
                let heading = double_to_int(saturate(
                    movement.heading,
                    Movement::MIN_HEADING,
                    Movement::MAX_HEADING,
                ));
                let speed = double_to_int(saturate(
                    movement.gnd_speed * MS_2_KMH,
                    Movement::MIN_GND_SPEED,
                    Movement::MAX_GND_SPEED,
                ));
                let climb = saturate(
                    movement.climb_rate,
                    Movement::MIN_CLIMB_RATE,
                    Movement::MAX_CLIMB_RATE,
                );
                buf.append_sentence(format_args!(
                    "PFLAA,0,{},{},{},{},{},{:03},,{},{:3.1},{:X}",
                    rel.north,
                    rel.east,
                    rel.vertical,
                    aircraft.id_type.as_raw(),
                    aircraft.id,
                    heading,
                    speed,
                    climb,
                    aircraft.aircraft_type.as_raw()
                ))
            }
            None => buf.append_sentence(format_args!(
                "PFLAA,0,{},{},{},1,{},,,,,{:X}",
                rel.north,
                rel.east,
                rel.vertical,
                aircraft.id,
                aircraft.aircraft_type.as_raw()
            )),
        }
    }
}
