use sprayplan_planner::error::{MissionFileError, PlanError, SessionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("usage: sprayplan_controller [session.json] [out_dir]: {0}")]
    Usage(String),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("none of the {0} colors in use could be planned")]
    NothingPlanned(usize),
    #[error("session: {0}")]
    Session(#[from] SessionError),
    #[error("mission file: {0}")]
    MissionFile(#[from] MissionFileError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
