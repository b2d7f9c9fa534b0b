use std::io::Write;

use log::debug;
use serde::Serialize;
use sprayplan_structs::{
    problem::Grid,
    report::{LayoutReport, LiquidReport, ParcelReport, PathReport, Report},
    ColorId, GeoPoint,
};
use tabwriter::TabWriter;

use crate::{
    assignment::AssignmentWarning,
    session::{LiquidPlan, Session},
};

fn color_name(color: &ColorId) -> String {
    color.display_name().unwrap_or(color.as_str()).to_string()
}

/// Collects layout, parcels and per-colour paths into one serializable value.
/// Colours in use without a plan in `plans` are listed with empty paths.
pub fn build_report(
    session: &Session,
    grid: &Grid,
    plans: &[LiquidPlan],
    warnings: &[AssignmentWarning],
) -> Report {
    let layout = LayoutReport {
        parcel_width: grid.parcel_width,
        parcel_height: grid.parcel_height,
        gap_x: grid.gap_x,
        gap_y: grid.gap_y,
        count_x: grid.count_x,
        count_y: grid.count_y,
        total_width: grid.total_width(),
        total_height: grid.total_height(),
        spray_width: session.spray_width,
        fit: session.parcels.fit,
        corners: session.field.corners(),
    };

    let parcels = grid
        .parcels
        .iter()
        .map(|p| ParcelReport {
            id: p.id,
            color: p.color.clone(),
            color_name: color_name(&p.color),
            liquid: if p.color.is_unassigned() {
                String::new()
            } else {
                session.liquid(&p.color).name
            },
            corners: p.corners,
        })
        .collect();

    let paths = session
        .colors_in_use(grid)
        .into_iter()
        .map(|color| match plans.iter().find(|p| p.color == color) {
            Some(plan) => PathReport {
                color_name: color_name(&color),
                liquid: plan.liquid.name.clone(),
                parameters: Some(LiquidReport {
                    dose_l_ha: plan.liquid.dose_l_ha,
                    nozzle_rate_l_min: plan.liquid.nozzle_rate_l_min,
                    nozzle_count: plan.liquid.nozzle_count,
                    altitude_m: plan.liquid.altitude_m,
                }),
                ground_speed_m_s: Some(plan.dose.ground_speed_m_s),
                total_distance_m: plan.path.total_distance_m,
                segments: plan.path.path.chunks_exact(2).map(|s| (s[0], s[1])).collect(),
                color,
            },
            None => PathReport {
                color_name: color_name(&color),
                liquid: session.liquid(&color).name,
                parameters: None,
                ground_speed_m_s: None,
                total_distance_m: 0.0,
                segments: Vec::new(),
                color,
            },
        })
        .collect::<Vec<_>>();
    debug!("report with {} parcels, {} paths", grid.parcels.len(), paths.len());

    Report {
        layout,
        parcels,
        paths,
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
    }
}

#[derive(Serialize)]
struct ParcelRow<'a> {
    id: usize,
    color: &'a str,
    color_name: &'a str,
    liquid: &'a str,
    top_left_lat: f64,
    top_left_lon: f64,
    top_right_lat: f64,
    top_right_lon: f64,
    bottom_right_lat: f64,
    bottom_right_lon: f64,
    bottom_left_lat: f64,
    bottom_left_lon: f64,
}

/// One CSV row per parcel with its colour, liquid and corner coordinates.
pub fn write_parcels_csv(w: impl Write, report: &Report) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(w);
    for p in report.parcels.iter() {
        let [tl, tr, br, bl] = p.corners;
        wtr.serialize(ParcelRow {
            id: p.id + 1,
            color: p.color.as_str(),
            color_name: &p.color_name,
            liquid: &p.liquid,
            top_left_lat: tl.lat,
            top_left_lon: tl.lon,
            top_right_lat: tr.lat,
            top_right_lon: tr.lon,
            bottom_right_lat: br.lat,
            bottom_right_lon: br.lon,
            bottom_left_lat: bl.lat,
            bottom_left_lon: bl.lon,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

fn point(p: &GeoPoint) -> String {
    format!("{:.7}, {:.7}", p.lat, p.lon)
}

/// Human-readable report with tab-aligned tables.
pub fn write_text_report(w: impl Write, report: &Report) -> std::io::Result<()> {
    let mut tw = TabWriter::new(w);
    let l = &report.layout;

    writeln!(&mut tw, "# LAYOUT")?;
    writeln!(&mut tw, "parcels\t{} x {}", l.count_x, l.count_y)?;
    writeln!(&mut tw, "parcel size\t{:.2} x {:.2} m", l.parcel_width, l.parcel_height)?;
    writeln!(&mut tw, "gaps\t{:.2} / {:.2} m", l.gap_x, l.gap_y)?;
    writeln!(&mut tw, "total size\t{:.2} x {:.2} m", l.total_width, l.total_height)?;
    writeln!(&mut tw, "spray width\t{:.2} m", l.spray_width)?;
    writeln!(&mut tw, "fit\t{:?}", l.fit)?;
    for (name, c) in ["top left", "top right", "bottom right", "bottom left"]
        .iter()
        .zip(l.corners.iter())
    {
        writeln!(&mut tw, "{}\t{}", name, point(c))?;
    }
    writeln!(&mut tw)?;

    writeln!(&mut tw, "# PARCELS")?;
    writeln!(&mut tw, "parcel\tcolor\tliquid\ttop left\tbottom right")?;
    writeln!(&mut tw, "---\t---\t---\t---\t---")?;
    for p in report.parcels.iter() {
        writeln!(
            &mut tw,
            "{}\t{}\t{}\t{}\t{}",
            p.id + 1,
            p.color_name,
            p.liquid,
            point(&p.corners[0]),
            point(&p.corners[2])
        )?;
    }
    writeln!(&mut tw)?;

    writeln!(&mut tw, "# PATHS")?;
    writeln!(&mut tw, "color\tliquid\tpasses\tdistance\tspeed\tdose\taltitude")?;
    writeln!(&mut tw, "---\t---\t---\t---\t---\t---\t---")?;
    for p in report.paths.iter() {
        let speed = p
            .ground_speed_m_s
            .map(|s| format!("{:.3} m/s", s))
            .unwrap_or_else(|| "-".to_string());
        let (dose, altitude) = p
            .parameters
            .as_ref()
            .map(|l| (format!("{} L/ha", l.dose_l_ha), format!("{} m", l.altitude_m)))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        writeln!(
            &mut tw,
            "{}\t{}\t{}\t{:.2} m\t{}\t{}\t{}",
            p.color_name,
            p.liquid,
            p.segments.len(),
            p.total_distance_m,
            speed,
            dose,
            altitude
        )?;
    }

    if !report.warnings.is_empty() {
        writeln!(&mut tw)?;
        writeln!(&mut tw, "# WARNINGS")?;
        for warning in report.warnings.iter() {
            writeln!(&mut tw, "- {}", warning)?;
        }
    }

    tw.flush()
}
