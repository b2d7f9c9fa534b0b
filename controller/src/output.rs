use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::debug;
use sprayplan_planner::{
    mission::write_mission,
    report::{write_parcels_csv, write_text_report},
    session::LiquidPlan,
};
use sprayplan_structs::report::Report;

use crate::error::ControllerError;

fn file_part(s: &str) -> String {
    s.trim()
        .trim_start_matches('#')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// `{color}_{liquid}_mission.waypoints`, e.g. `red_1_mission.waypoints`.
pub fn mission_file_name(plan: &LiquidPlan) -> String {
    let color = plan.color.display_name().unwrap_or(plan.color.as_str());
    format!("{}_{}_mission.waypoints", file_part(color), file_part(&plan.liquid.name))
}

/// Writes every mission file plus `report.json`, `report.txt` and
/// `parcels.csv` into `dir`, creating it if needed. Returns the written paths.
pub fn write_all(dir: &Path, report: &Report, plans: &[LiquidPlan]) -> Result<Vec<PathBuf>, ControllerError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for plan in plans.iter() {
        let path = dir.join(mission_file_name(plan));
        debug!("writing {} waypoints to {}", plan.mission.len(), path.display());
        write_mission(BufWriter::new(File::create(&path)?), &plan.mission)?;
        written.push(path);
    }

    let path = dir.join("report.json");
    let mut w = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut w, report)?;
    w.flush()?;
    written.push(path);

    let path = dir.join("report.txt");
    write_text_report(BufWriter::new(File::create(&path)?), report)?;
    written.push(path);

    let path = dir.join("parcels.csv");
    write_parcels_csv(File::create(&path)?, report)?;
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprayplan_planner::{assignment::check_all, mission::read_mission, report::build_report, Session};

    fn plans(session: &Session) -> (Report, Vec<LiquidPlan>) {
        let grid = session.generate_grid().unwrap();
        let warnings = check_all(&session.field, &grid);
        let plans = session
            .colors_in_use(&grid)
            .iter()
            .map(|c| session.plan_liquid(&grid, c).unwrap())
            .collect::<Vec<_>>();
        (build_report(session, &grid, &plans, &warnings), plans)
    }

    #[test]
    fn file_names() {
        let (_, plans) = plans(&Session::default());
        let names = plans.iter().map(mission_file_name).collect::<Vec<_>>();
        assert!(names.contains(&"red_1_mission.waypoints".to_string()));
        assert!(names.contains(&"008000_2_mission.waypoints".to_string()));
    }

    #[test]
    fn writes_every_output() {
        let _ = env_logger::try_init();
        let session = Session::default();
        let (report, plans) = plans(&session);

        let dir = std::env::temp_dir().join(format!("sprayplan_output_{}", std::process::id()));
        let written = write_all(&dir, &report, &plans).unwrap();
        assert_eq!(written.len(), plans.len() + 3);
        for path in written.iter() {
            assert!(path.exists(), "{} missing", path.display());
        }

        let mission = std::fs::read(dir.join("red_1_mission.waypoints")).unwrap();
        let back = read_mission(mission.as_slice()).unwrap();
        let red = plans.iter().find(|p| p.color.as_str() == "#ff0000").unwrap();
        assert_eq!(back.len(), red.mission.len());

        let json = std::fs::read_to_string(dir.join("report.json")).unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.parcels.len(), 30);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
