use sprayplan_structs::ColorId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid field geometry: {0}")]
    InvalidGeometry(String),
    #[error("spray width {spray_width} m does not evenly divide parcel width {parcel_width} m")]
    UnevenDivision { parcel_width: f64, spray_width: f64 },
    #[error("no parcels to plan")]
    NoParcels,
    #[error("no parcels with color {0}")]
    NoMatchingColor(ColorId),
    #[error("invalid input: {name} = {value}")]
    InvalidInput { name: &'static str, value: f64 },
    #[error("path has {path} points but {points} pass endpoints")]
    PointCountMismatch { path: usize, points: usize },
    #[error("empty path")]
    EmptyPath,
}

#[derive(Debug, Error)]
pub enum MissionFileError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing QGC WPL 110 header")]
    MissingHeader,
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Checks that `value` is strictly positive and finite.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, PlanError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PlanError::InvalidInput { name, value })
    }
}
