use std::io::{BufRead, Write};

use log::{debug, info};
use sprayplan_structs::{
    mission::{MavCmd, MavFrame, MissionWaypoint},
    plan::ScanPath,
    GeoPoint,
};

use crate::error::{positive, MissionFileError, PlanError};

pub const WPL_HEADER: &str = "QGC WPL 110";

/// Altitude written on the home waypoint, in the absolute frame.
pub const HOME_ALTITUDE_M: f64 = 1.99;

pub const DEFAULT_SPRAY_SERVO: u16 = 0;

/// DO_CHANGE_SPEED speed type for ground speed.
const SPEED_TYPE_GROUND: f64 = 1.0;

struct Sequencer {
    waypoints: Vec<MissionWaypoint>,
}

impl Sequencer {
    fn push(&mut self, frame: MavFrame, command: MavCmd, params: [f64; 4], position: GeoPoint, altitude: f64) {
        let seq = self.waypoints.len() as u32;
        self.waypoints.push(MissionWaypoint {
            seq,
            current: seq == 0,
            frame,
            command,
            params,
            position,
            altitude,
            autocontinue: true,
        });
    }
}

/// Builds the mission with spray triggers on [`DEFAULT_SPRAY_SERVO`].
pub fn compose(
    path: &ScanPath,
    home: GeoPoint,
    altitude_m: f64,
    ground_speed_m_s: f64,
) -> Result<Vec<MissionWaypoint>, PlanError> {
    compose_with_servo(path, home, altitude_m, ground_speed_m_s, DEFAULT_SPRAY_SERVO)
}

/// Home, takeoff, set speed, then four waypoints per pass (approach,
/// spray on, spray off, depart), then return to launch.
pub fn compose_with_servo(
    path: &ScanPath,
    home: GeoPoint,
    altitude_m: f64,
    ground_speed_m_s: f64,
    spray_servo: u16,
) -> Result<Vec<MissionWaypoint>, PlanError> {
    if path.path.is_empty() {
        return Err(PlanError::EmptyPath);
    }
    if !path.is_consistent() {
        return Err(PlanError::PointCountMismatch {
            path: path.path.len(),
            points: path.unbuffered_points.len(),
        });
    }
    positive("altitude_m", altitude_m)?;
    positive("ground_speed_m_s", ground_speed_m_s)?;

    let origin = GeoPoint::default();
    let servo = spray_servo as f64;
    let mut seq = Sequencer {
        waypoints: Vec::with_capacity(4 + 4 * path.num_passes()),
    };

    seq.push(MavFrame::Global, MavCmd::NavWaypoint, [0.0; 4], home, HOME_ALTITUDE_M);
    seq.push(MavFrame::GlobalRelativeAlt, MavCmd::NavTakeoff, [0.0; 4], origin, altitude_m);
    seq.push(
        MavFrame::GlobalRelativeAlt,
        MavCmd::DoChangeSpeed,
        [SPEED_TYPE_GROUND, ground_speed_m_s, -1.0, 0.0],
        origin,
        0.0,
    );

    for leg in path.legs() {
        let rel = MavFrame::GlobalRelativeAlt;
        seq.push(rel, MavCmd::NavWaypoint, [0.0; 4], leg.approach, altitude_m);
        seq.push(rel, MavCmd::DoSetServo, [servo, 1.0, 0.0, 0.0], leg.spray_on, altitude_m);
        seq.push(rel, MavCmd::DoSetServo, [servo, 0.0, 0.0, 0.0], leg.spray_off, altitude_m);
        seq.push(rel, MavCmd::NavWaypoint, [0.0; 4], leg.depart, altitude_m);
    }

    seq.push(
        MavFrame::GlobalRelativeAlt,
        MavCmd::NavReturnToLaunch,
        [0.0; 4],
        origin,
        0.0,
    );

    info!(
        "mission for {}: {} waypoints at {} m, {} m/s",
        path.color,
        seq.waypoints.len(),
        altitude_m,
        ground_speed_m_s
    );
    Ok(seq.waypoints)
}

fn number(x: f64) -> String {
    // Avoid writing "-0".
    if x == 0.0 {
        "0".to_string()
    } else {
        format!("{}", x)
    }
}

/// Shortest round-trip form, keeping one decimal on whole numbers ("25.0").
fn real(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{:.1}", x)
    } else {
        format!("{}", x)
    }
}

/// One tab-separated line. Measured values (coordinates, altitudes, speed)
/// are written as reals, command constants and unused fields as integers,
/// and the home altitude with six decimals.
pub fn format_waypoint(wp: &MissionWaypoint) -> String {
    let positioned = matches!(wp.command, MavCmd::NavWaypoint | MavCmd::DoSetServo);
    let (lat, lon) = if positioned {
        (real(wp.position.lat), real(wp.position.lon))
    } else {
        (number(wp.position.lat), number(wp.position.lon))
    };
    let altitude = if wp.frame == MavFrame::Global {
        format!("{:.6}", wp.altitude)
    } else if positioned || wp.command == MavCmd::NavTakeoff {
        real(wp.altitude)
    } else {
        number(wp.altitude)
    };
    let param = |i: usize| {
        if wp.command == MavCmd::DoChangeSpeed && i == 1 {
            real(wp.params[i])
        } else {
            number(wp.params[i])
        }
    };

    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        wp.seq,
        wp.current as u8,
        wp.frame.code(),
        wp.command.code(),
        param(0),
        param(1),
        param(2),
        param(3),
        lat,
        lon,
        altitude,
        wp.autocontinue as u8,
    )
}

/// Header line followed by one tab-separated line per waypoint, no trailing newline.
pub fn mission_to_string(waypoints: &[MissionWaypoint]) -> String {
    let mut lines = Vec::with_capacity(waypoints.len() + 1);
    lines.push(WPL_HEADER.to_string());
    lines.extend(waypoints.iter().map(format_waypoint));
    lines.join("\n")
}

pub fn write_mission(mut w: impl Write, waypoints: &[MissionWaypoint]) -> Result<(), MissionFileError> {
    w.write_all(mission_to_string(waypoints).as_bytes())?;
    w.flush()?;
    Ok(())
}

fn parse_field<T: std::str::FromStr>(fields: &[&str], idx: usize, line: usize) -> Result<T, MissionFileError> {
    fields[idx].trim().parse::<T>().map_err(|_| MissionFileError::Malformed {
        line,
        reason: format!("field {} is not a number: {:?}", idx, fields[idx]),
    })
}

fn parse_flag(fields: &[&str], idx: usize, line: usize) -> Result<bool, MissionFileError> {
    match parse_field::<u8>(fields, idx, line)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(MissionFileError::Malformed {
            line,
            reason: format!("field {} must be 0 or 1, got {}", idx, other),
        }),
    }
}

pub fn parse_waypoint(text: &str, line: usize) -> Result<MissionWaypoint, MissionFileError> {
    let fields = text.split('\t').collect::<Vec<_>>();
    if fields.len() != 12 {
        return Err(MissionFileError::Malformed {
            line,
            reason: format!("expected 12 fields, got {}", fields.len()),
        });
    }

    let frame_code = parse_field::<u8>(&fields, 2, line)?;
    let frame = MavFrame::from_code(frame_code).ok_or_else(|| MissionFileError::Malformed {
        line,
        reason: format!("unsupported frame {}", frame_code),
    })?;
    let command_code = parse_field::<u16>(&fields, 3, line)?;
    let command = MavCmd::from_code(command_code).ok_or_else(|| MissionFileError::Malformed {
        line,
        reason: format!("unsupported command {}", command_code),
    })?;

    Ok(MissionWaypoint {
        seq: parse_field(&fields, 0, line)?,
        current: parse_flag(&fields, 1, line)?,
        frame,
        command,
        params: [
            parse_field(&fields, 4, line)?,
            parse_field(&fields, 5, line)?,
            parse_field(&fields, 6, line)?,
            parse_field(&fields, 7, line)?,
        ],
        position: GeoPoint::new(parse_field(&fields, 8, line)?, parse_field(&fields, 9, line)?),
        altitude: parse_field(&fields, 10, line)?,
        autocontinue: parse_flag(&fields, 11, line)?,
    })
}

/// Reads a QGC WPL 110 file. Blank lines are skipped.
pub fn read_mission(r: impl BufRead) -> Result<Vec<MissionWaypoint>, MissionFileError> {
    let mut lines = r.lines();
    let header = lines.next().transpose()?;
    if header.as_deref().map(str::trim) != Some(WPL_HEADER) {
        return Err(MissionFileError::MissingHeader);
    }

    let mut waypoints = Vec::new();
    for (idx, text) in lines.enumerate() {
        let text = text?;
        if text.trim().is_empty() {
            continue;
        }
        waypoints.push(parse_waypoint(text.trim_end_matches('\r'), idx + 2)?);
    }
    debug!("read {} waypoints", waypoints.len());
    Ok(waypoints)
}
