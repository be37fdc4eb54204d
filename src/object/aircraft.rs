use super::Position;

/// Address type of an aircraft id, as transmitted in FLARM/OGN messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum IdType {
    Random = 0,
    #[default]
    Icao = 1,
    Flarm = 2,
    Ogn = 3,
}

impl IdType {
    /// Map a raw value, anything unknown becomes `Random`
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Icao,
            2 => Self::Flarm,
            3 => Self::Ogn,
            _ => Self::Random,
        }
    }

    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

/// FLARM aircraft category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AircraftType {
    Unknown = 0,
    Glider = 1,
    TowPlane = 2,
    Helicopter = 3,
    Parachute = 4,
    DropPlane = 5,
    HangGlider = 6,
    Paraglider = 7,
    #[default]
    PoweredAircraft = 8,
    JetAircraft = 9,
    Ufo = 10,
    Balloon = 11,
    Airship = 12,
    Uav = 13,
    StaticObject = 15,
}

impl AircraftType {
    /// Map a raw value, anything unknown becomes `Unknown`
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Glider,
            2 => Self::TowPlane,
            3 => Self::Helicopter,
            4 => Self::Parachute,
            5 => Self::DropPlane,
            6 => Self::HangGlider,
            7 => Self::Paraglider,
            8 => Self::PoweredAircraft,
            9 => Self::JetAircraft,
            10 => Self::Ufo,
            11 => Self::Balloon,
            12 => Self::Airship,
            13 => Self::Uav,
            15 => Self::StaticObject,
            _ => Self::Unknown,
        }
    }

    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

/// Fidelity of the last high quality source for an aircraft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Transponder derived; altitude is barometric
    Transponder,
    /// Cooperative FLARM broadcast; altitude is geometric
    Flarm,
}

/// Horizontal and vertical movement
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Movement {
    /// Track over ground in degrees
    pub heading: f64,
    /// Ground speed in m/s
    pub gnd_speed: f64,
    /// Climb rate in m/s
    pub climb_rate: f64,
}

impl Movement {
    pub const MIN_HEADING: f64 = 0.0;
    pub const MAX_HEADING: f64 = 359.0;
    /// Ground speed limits in km/h
    pub const MIN_GND_SPEED: f64 = 0.0;
    pub const MAX_GND_SPEED: f64 = 10_000.0;
    /// Climb rate limits in m/s
    pub const MIN_CLIMB_RATE: f64 = -32.8;
    pub const MAX_CLIMB_RATE: f64 = 32.8;
}

/// A tracked aircraft
#[derive(Debug, Clone, PartialEq)]
pub struct Aircraft {
    pub id: String,
    pub id_type: IdType,
    pub aircraft_type: AircraftType,
    pub target_kind: TargetKind,
    pub position: Position,
    /// Present only when the source delivered heading, speed and climb rate
    pub movement: Option<Movement>,
}

impl Aircraft {
    /// Aircraft with transponder defaults: ICAO id, powered aircraft, no movement
    pub fn new(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            id_type: IdType::Icao,
            aircraft_type: AircraftType::PoweredAircraft,
            target_kind: TargetKind::Transponder,
            position,
            movement: None,
        }
    }

    pub fn with_target_kind(mut self, kind: TargetKind) -> Self {
        self.target_kind = kind;
        self
    }

    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movement = Some(movement);
        self
    }

    pub fn with_types(mut self, id_type: IdType, aircraft_type: AircraftType) -> Self {
        self.id_type = id_type;
        self.aircraft_type = aircraft_type;
        self
    }

    pub fn has_full_info(&self) -> bool {
        self.movement.is_some()
    }
}
