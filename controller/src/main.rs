use std::path::PathBuf;

use error::ControllerError;
use log::{error, info, warn};
use sprayplan_planner::{
    assignment::check_all,
    report::build_report,
    session::{LiquidPlan, Session},
};
use sprayplan_structs::problem::Grid;

pub mod error;
pub mod output;

fn main() {
    env_logger::init();
    if let Err(e) = run(std::env::args().skip(1)) {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// `[session.json] [out_dir]`. Without a session file the defaults are used.
fn run(mut args: impl Iterator<Item = String>) -> Result<(), ControllerError> {
    let session = match args.next() {
        Some(path) => Session::load(&path)?,
        None => {
            info!("no session file given, using defaults");
            Session::default()
        }
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    if let Some(extra) = args.next() {
        return Err(ControllerError::Usage(format!("unexpected argument {:?}", extra)));
    }

    let grid = session.generate_grid()?;
    let warnings = check_all(&session.field, &grid);

    let plans = plan_colors(&session, &grid)?;

    let report = build_report(&session, &grid, &plans, &warnings);
    let written = output::write_all(&out_dir, &report, &plans)?;
    for path in written.iter() {
        println!("{}", path.display());
    }
    info!("wrote {} files to {}", written.len(), out_dir.display());
    Ok(())
}

/// Plans every colour in use. Colours that fail are logged and skipped, but
/// failing all of them is an error.
fn plan_colors(session: &Session, grid: &Grid) -> Result<Vec<LiquidPlan>, ControllerError> {
    let colors = session.colors_in_use(grid);
    let mut plans = Vec::new();
    for color in colors.iter() {
        match session.plan_liquid(grid, color) {
            Ok(plan) => plans.push(plan),
            Err(e) => warn!("skipping color {}: {}", color, e),
        }
    }
    if plans.is_empty() && !colors.is_empty() {
        return Err(ControllerError::NothingPlanned(colors.len()));
    }
    Ok(plans)
}
