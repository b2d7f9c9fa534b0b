use std::{collections::BTreeMap, fmt};

use log::warn;
use serde::Serialize;
use sprayplan_structs::{
    problem::{ColorAssignment, FieldQuadrilateral, Grid},
    ColorId,
};

/// Findings that deserve an operator's attention but never block planning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AssignmentWarning {
    /// A colour is used on more parcels than there are columns.
    OverusedColor { color: ColorId, count: usize, limit: usize },
    /// Zero-based rows that contain at least one unassigned parcel.
    RowsWithUnassigned(Vec<usize>),
    /// `parcel` sits directly below `above` and shares its colour.
    SameColorAbove { parcel: usize, above: usize, color: ColorId },
    SelfIntersectingField,
}

fn color_label(color: &ColorId) -> &str {
    color.display_name().unwrap_or(color.as_str())
}

impl fmt::Display for AssignmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentWarning::OverusedColor { color, count, limit } => write!(
                f,
                "color '{}' is used {} times, which exceeds the number of columns ({})",
                color_label(color),
                count,
                limit
            ),
            AssignmentWarning::RowsWithUnassigned(rows) => {
                let rows = rows
                    .iter()
                    .map(|r| (r + 1).to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "rows {} have unassigned parcels", rows)
            }
            AssignmentWarning::SameColorAbove { parcel, above, color } => write!(
                f,
                "parcel {} has the same color '{}' as parcel {} directly above it",
                parcel + 1,
                color_label(color),
                above + 1
            ),
            AssignmentWarning::SelfIntersectingField => {
                write!(f, "field corners form a self-intersecting quadrilateral")
            }
        }
    }
}

/// Colour usage checks over a generated grid.
pub fn check_grid(grid: &Grid) -> Vec<AssignmentWarning> {
    let mut warnings = Vec::new();
    if grid.count_x == 0 {
        return warnings;
    }

    let mut usage: BTreeMap<&ColorId, usize> = BTreeMap::new();
    for p in grid.parcels.iter().filter(|p| !p.color.is_unassigned()) {
        *usage.entry(&p.color).or_default() += 1;
    }
    for (color, count) in usage {
        if count > grid.count_x {
            warnings.push(AssignmentWarning::OverusedColor {
                color: color.clone(),
                count,
                limit: grid.count_x,
            });
        }
    }

    let mut rows = grid
        .parcels
        .iter()
        .filter(|p| p.color.is_unassigned())
        .map(|p| p.row(grid.count_x))
        .collect::<Vec<_>>();
    rows.dedup();
    if !rows.is_empty() {
        warnings.push(AssignmentWarning::RowsWithUnassigned(rows));
    }

    for p in grid.parcels.iter().skip(grid.count_x) {
        let above = &grid.parcels[p.id - grid.count_x];
        if !p.color.is_unassigned() && p.color == above.color {
            warnings.push(AssignmentWarning::SameColorAbove {
                parcel: p.id,
                above: above.id,
                color: p.color.clone(),
            });
        }
    }

    warnings
}

pub fn check_field(quad: &FieldQuadrilateral) -> Option<AssignmentWarning> {
    (!quad.is_simple()).then_some(AssignmentWarning::SelfIntersectingField)
}

/// Layout and assignment checks, logged as warnings.
pub fn check_all(quad: &FieldQuadrilateral, grid: &Grid) -> Vec<AssignmentWarning> {
    let mut warnings = check_field(quad).into_iter().collect::<Vec<_>>();
    warnings.extend(check_grid(grid));
    for w in warnings.iter() {
        warn!("{}", w);
    }
    warnings
}

/// Tags every parcel id missing from `assignment` as unassigned.
pub fn fill_unassigned(assignment: &mut ColorAssignment, count_x: usize, count_y: usize) {
    for id in 0..count_x * count_y {
        assignment.entry(id).or_insert_with(ColorId::unassigned);
    }
}
