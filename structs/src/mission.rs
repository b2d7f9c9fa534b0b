use serde::{Deserialize, Serialize};

use crate::GeoPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MavCmd {
    NavWaypoint,
    NavReturnToLaunch,
    NavTakeoff,
    DoChangeSpeed,
    DoSetServo,
}

impl MavCmd {
    pub fn code(&self) -> u16 {
        match self {
            MavCmd::NavWaypoint => 16,
            MavCmd::NavReturnToLaunch => 20,
            MavCmd::NavTakeoff => 22,
            MavCmd::DoChangeSpeed => 178,
            MavCmd::DoSetServo => 183,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            16 => Some(MavCmd::NavWaypoint),
            20 => Some(MavCmd::NavReturnToLaunch),
            22 => Some(MavCmd::NavTakeoff),
            178 => Some(MavCmd::DoChangeSpeed),
            183 => Some(MavCmd::DoSetServo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MavFrame {
    /// Absolute altitude above mean sea level.
    Global,
    /// Altitude relative to home.
    GlobalRelativeAlt,
}

impl MavFrame {
    pub fn code(&self) -> u8 {
        match self {
            MavFrame::Global => 0,
            MavFrame::GlobalRelativeAlt => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MavFrame::Global),
            3 => Some(MavFrame::GlobalRelativeAlt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MissionWaypoint {
    pub seq: u32,
    pub current: bool,
    pub frame: MavFrame,
    pub command: MavCmd,
    pub params: [f64; 4],
    /// (0, 0) for commands without a location.
    pub position: GeoPoint,
    pub altitude: f64,
    pub autocontinue: bool,
}

impl MissionWaypoint {
    pub fn is_spray_trigger(&self) -> bool {
        self.command == MavCmd::DoSetServo
    }
}
