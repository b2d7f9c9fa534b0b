use std::{collections::BTreeMap, path::Path};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use sprayplan_structs::{
    mission::MissionWaypoint,
    plan::ScanPath,
    problem::{ColorAssignment, FieldQuadrilateral, FitMode, Grid, ParcelSpec},
    ColorId, GeoPoint,
};

use crate::{
    coverage::{self, SprayPattern},
    dose::{dose_breakdown, DoseBreakdown, DoseInputs},
    error::{PlanError, SessionError},
    grid, mission,
};

/// Operator label and application parameters for one colour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Liquid {
    pub name: String,
    pub dose_l_ha: f64,
    pub nozzle_rate_l_min: f64,
    pub nozzle_count: u32,
    pub altitude_m: f64,
}

impl Liquid {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dose_l_ha: 300.0,
            nozzle_rate_l_min: 0.8,
            nozzle_count: 4,
            altitude_m: 25.0,
        }
    }
}

/// Everything the planning stages need, passed explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub field: FieldQuadrilateral,
    pub parcels: ParcelSpec,
    /// Painted colours by parcel id. When absent the palette is cycled.
    pub assignment: Option<ColorAssignment>,
    pub spray_width: f64,
    pub acceleration_buffer_m: f64,
    pub spray_servo: u16,
    pub liquids: BTreeMap<ColorId, Liquid>,
}

impl Default for Session {
    fn default() -> Self {
        let palette = ColorId::default_palette();
        let liquids = palette
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), Liquid::named(format!("{}", i + 1))))
            .collect();

        Session {
            field: FieldQuadrilateral {
                top_left: GeoPoint::new(37.32500, -6.02884),
                top_right: GeoPoint::new(37.32490, -6.02861),
                bottom_right: GeoPoint::new(37.32427, -6.02829),
                bottom_left: GeoPoint::new(37.32466, -6.02899),
            },
            parcels: ParcelSpec {
                parcel_width: 3.0,
                parcel_height: 5.0,
                gap_x: 0.3,
                gap_y: 1.0,
                count_x: 6,
                count_y: 5,
                fit: FitMode::NoFit,
                colors: palette,
            },
            assignment: None,
            spray_width: 1.5,
            acceleration_buffer_m: 2.0,
            spray_servo: mission::DEFAULT_SPRAY_SERVO,
            liquids,
        }
    }
}

/// Path, dose figures and mission for one colour.
#[derive(Debug, Clone)]
pub struct LiquidPlan {
    pub color: ColorId,
    pub liquid: Liquid,
    pub path: ScanPath,
    pub dose: DoseBreakdown,
    pub mission: Vec<MissionWaypoint>,
}

impl Session {
    pub fn from_json_str(s: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        debug!("loading session from {}", path.display());
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_json_string(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn generate_grid(&self) -> Result<Grid, PlanError> {
        grid::generate(&self.field, &self.parcels, self.assignment.as_ref())
    }

    /// Parcel width and height used for pass counting and dosing. Sizes
    /// scaled by `FitScaleBoth` are rounded to whole meters, so that a
    /// fitted layout can still be divided into spray passes.
    pub fn planning_size(&self, grid: &Grid) -> (f64, f64) {
        match self.parcels.fit {
            FitMode::FitScaleBoth => (grid.parcel_width.round(), grid.parcel_height.round()),
            FitMode::NoFit | FitMode::FitPreserveParcelSize => (grid.parcel_width, grid.parcel_height),
        }
    }

    pub fn spray_pattern(&self, grid: &Grid) -> SprayPattern {
        SprayPattern {
            parcel_width: self.planning_size(grid).0,
            spray_width: self.spray_width,
            acceleration_buffer_m: self.acceleration_buffer_m,
        }
    }

    /// The configured liquid, or defaults labelled with the colour name.
    pub fn liquid(&self, color: &ColorId) -> Liquid {
        self.liquids.get(color).cloned().unwrap_or_else(|| {
            Liquid::named(color.display_name().unwrap_or(color.as_str()))
        })
    }

    /// Distinct assigned colours of the grid, in sorted order.
    pub fn colors_in_use(&self, grid: &Grid) -> Vec<ColorId> {
        let mut colors = grid
            .parcels
            .iter()
            .map(|p| p.color.clone())
            .filter(|c| !c.is_unassigned())
            .collect::<Vec<_>>();
        colors.sort();
        colors.dedup();
        colors
    }

    pub fn plan_liquid(&self, grid: &Grid, color: &ColorId) -> Result<LiquidPlan, PlanError> {
        let liquid = self.liquid(color);
        let (parcel_width, parcel_height) = self.planning_size(grid);
        let path = coverage::plan(&grid.parcels, color, &self.spray_pattern(grid))?;
        let dose = dose_breakdown(&DoseInputs {
            dose_l_ha: liquid.dose_l_ha,
            nozzle_rate_l_min: liquid.nozzle_rate_l_min,
            nozzle_count: liquid.nozzle_count,
            spray_width_m: self.spray_width,
            parcel_width_m: parcel_width,
            parcel_height_m: parcel_height,
            parcels_to_spray: grid.parcels_with_color(color).count(),
        })?;
        let mission = mission::compose_with_servo(
            &path,
            grid::home_point(&self.field),
            liquid.altitude_m,
            dose.ground_speed_m_s,
            self.spray_servo,
        )?;
        info!(
            "liquid {:?} ({}): {:.2} m path, {:.3} m/s",
            liquid.name, color, path.total_distance_m, dose.ground_speed_m_s
        );

        Ok(LiquidPlan {
            color: color.clone(),
            liquid,
            path,
            dose,
            mission,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Session::default();
        assert_eq!(s.parcels.count_x * s.parcels.count_y, 30);
        assert_eq!(s.liquids.len(), 6);
        assert_eq!(s.liquid(&ColorId::new("#ff0000")).name, "1");
        assert_eq!(s.liquid(&ColorId::new("#8b0000")).name, "Dark red");
    }

    #[test]
    fn json_round_trip_with_assignment() {
        let mut s = Session::default();
        let mut assignment = ColorAssignment::new();
        assignment.insert(4, ColorId::new("#00FFFF"));
        s.assignment = Some(assignment);

        let text = s.to_json_string().unwrap();
        let back = Session::from_json_str(&text).unwrap();
        assert_eq!(back.assignment, s.assignment);
        assert_eq!(back.field, s.field);
        assert_eq!(back.liquids, s.liquids);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let s = Session::from_json_str(r#"{ "spray_width": 1.0 }"#).unwrap();
        assert_eq!(s.spray_width, 1.0);
        assert_eq!(s.acceleration_buffer_m, 2.0);
        assert_eq!(s.parcels.count_x, 6);
    }

    #[test]
    fn plans_every_default_color() {
        let _ = env_logger::try_init();
        let s = Session::default();
        let grid = s.generate_grid().unwrap();
        let colors = s.colors_in_use(&grid);
        assert_eq!(colors.len(), 6);

        for color in &colors {
            let plan = s.plan_liquid(&grid, color).unwrap();
            let parcels = grid.parcels_with_color(color).count();
            assert_eq!(plan.path.num_passes(), parcels * 2);
            assert_eq!(plan.mission.len(), 4 + 4 * plan.path.num_passes());
            assert!(plan.dose.ground_speed_m_s > 0.0);
        }
    }

    #[test]
    fn fitted_session_plans_with_rounded_size() {
        let _ = env_logger::try_init();
        let mut s = Session::default();
        s.parcels.fit = FitMode::FitScaleBoth;
        s.spray_width = 1.0;
        let grid = s.generate_grid().unwrap();
        assert!(grid.parcel_width.fract() != 0.0);

        let (width, height) = s.planning_size(&grid);
        assert_eq!(width, grid.parcel_width.round());
        assert_eq!(height, grid.parcel_height.round());
        assert_eq!(s.spray_pattern(&grid).parcel_width, width);

        for color in s.colors_in_use(&grid) {
            let plan = s.plan_liquid(&grid, &color).unwrap();
            let parcels = grid.parcels_with_color(&color).count();
            assert_eq!(plan.path.num_passes(), parcels * width as usize);
            let expected = crate::dose::required_speed(300.0, 0.8, 4, 1.0, width, height, parcels).unwrap();
            assert_eq!(plan.dose.ground_speed_m_s, expected);
        }
    }

    #[test]
    fn unfitted_sizes_are_not_rounded() {
        let mut s = Session::default();
        s.parcels.parcel_width = 3.3;
        s.parcels.fit = FitMode::FitPreserveParcelSize;
        let grid = s.generate_grid().unwrap();
        assert_eq!(s.planning_size(&grid), (3.3, 5.0));
    }

    #[test]
    fn unassigned_parcels_are_not_planned() {
        let mut s = Session::default();
        let mut assignment = ColorAssignment::new();
        assignment.insert(0, ColorId::new("#ff0000"));
        s.assignment = Some(assignment);
        let grid = s.generate_grid().unwrap();
        assert_eq!(s.colors_in_use(&grid), vec![ColorId::new("#ff0000")]);
    }
}
