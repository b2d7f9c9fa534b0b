pub mod assignment;
pub mod coverage;
pub mod dose;
pub mod error;
pub mod geo;
pub mod grid;
pub mod mission;
pub mod report;
pub mod session;

pub use coverage::{plan, SprayPattern};
pub use dose::required_speed;
pub use error::{MissionFileError, PlanError};
pub use grid::generate;
pub use mission::compose;
pub use session::Session;
