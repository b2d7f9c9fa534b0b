use log::{debug, info};
use sprayplan_structs::{
    problem::{layout_extent, ColorAssignment, FieldQuadrilateral, FitMode, Grid, Parcel, ParcelSpec},
    ColorId, GeoPoint,
};

use crate::{error::PlanError, geo::grid_axis_bearing};

const DEGENERATE_EXTENT: f64 = 1e-12;

/// Parcel and gap sizes after the fit policy has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub parcel_width: f64,
    pub parcel_height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
}

pub fn fit_dimensions(area_width: f64, area_height: f64, spec: &ParcelSpec) -> Dimensions {
    let mut dims = Dimensions {
        parcel_width: spec.parcel_width,
        parcel_height: spec.parcel_height,
        gap_x: spec.gap_x,
        gap_y: spec.gap_y,
    };

    if spec.fit == FitMode::NoFit {
        return dims;
    }
    if spec.count_x == 0 || spec.count_y == 0 {
        debug!("fit {:?}: no parcels to fit", spec.fit);
        return dims;
    }

    let clamp = |total: f64| {
        if total.abs() < DEGENERATE_EXTENT {
            DEGENERATE_EXTENT
        } else {
            total
        }
    };
    let total_w = clamp(layout_extent(spec.count_x, dims.parcel_width, dims.gap_x));
    let total_h = clamp(layout_extent(spec.count_y, dims.parcel_height, dims.gap_y));
    let scale = (area_width / total_w).min(area_height / total_h);
    debug!(
        "fit {:?}: area {:.3} x {:.3} m, layout {:.3} x {:.3} m, scale {}",
        spec.fit, area_width, area_height, total_w, total_h, scale
    );

    if spec.fit == FitMode::FitScaleBoth {
        dims.parcel_width *= scale;
        dims.parcel_height *= scale;
    }

    for gap in [&mut dims.gap_x, &mut dims.gap_y] {
        if gap.abs() > DEGENERATE_EXTENT {
            *gap *= scale;
        }
        if gap.abs() < DEGENERATE_EXTENT {
            *gap = 0.0;
        }
    }

    dims
}

fn check_geometry(quad: &FieldQuadrilateral, spec: &ParcelSpec) -> Result<(), PlanError> {
    if let Some(corner) = quad.corners().iter().find(|c| !c.is_finite()) {
        return Err(PlanError::InvalidGeometry(format!(
            "non-finite corner {}",
            corner
        )));
    }
    if quad.top_left == quad.top_right {
        return Err(PlanError::InvalidGeometry(
            "top edge has zero length".to_string(),
        ));
    }
    if quad.top_left == quad.bottom_left {
        return Err(PlanError::InvalidGeometry(
            "left edge has zero length".to_string(),
        ));
    }

    for (name, value) in [
        ("parcel_width", spec.parcel_width),
        ("parcel_height", spec.parcel_height),
        ("gap_x", spec.gap_x),
        ("gap_y", spec.gap_y),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(PlanError::InvalidInput { name, value });
        }
    }
    Ok(())
}

/// Lays out `count_x * count_y` parcels from the top-left corner of `quad`.
///
/// Parcel `id = row * count_x + col`. Colours come from `assignment` when
/// given (missing ids become unassigned), otherwise `spec.colors` is cycled
/// over the ids, falling back to the default palette when it is empty.
/// Self-intersecting quadrilaterals are not rejected; see
/// [`FieldQuadrilateral::is_simple`].
pub fn generate(
    quad: &FieldQuadrilateral,
    spec: &ParcelSpec,
    assignment: Option<&ColorAssignment>,
) -> Result<Grid, PlanError> {
    #[cfg(feature = "prof")]
    let _p = hprof::enter("generate grid");
    check_geometry(quad, spec)?;

    let area_width = quad.top_left.haversine_m(&quad.top_right);
    let area_height = quad.top_left.haversine_m(&quad.bottom_left);
    let dims = fit_dimensions(area_width, area_height, spec);

    let bearing_x = grid_axis_bearing(&quad.top_left, &quad.top_right);
    let bearing_y = grid_axis_bearing(&quad.top_left, &quad.bottom_left);
    debug!("grid axes: bearing_x {} rad, bearing_y {} rad", bearing_x, bearing_y);

    let palette = if spec.colors.is_empty() {
        ColorId::default_palette()
    } else {
        spec.colors.clone()
    };

    let mut parcels = Vec::with_capacity(spec.count_x * spec.count_y);
    for j in 0..spec.count_y {
        for i in 0..spec.count_x {
            let id = j * spec.count_x + i;
            let origin = quad
                .top_left
                .destination(i as f64 * (dims.parcel_width + dims.gap_x), bearing_x)
                .destination(j as f64 * (dims.parcel_height + dims.gap_y), bearing_y);
            let top_right = origin.destination(dims.parcel_width, bearing_x);
            let bottom_right = top_right.destination(dims.parcel_height, bearing_y);
            let bottom_left = origin.destination(dims.parcel_height, bearing_y);

            let color = match assignment {
                Some(assignment) => assignment
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(ColorId::unassigned),
                None => palette[id % palette.len()].clone(),
            };

            parcels.push(Parcel {
                id,
                corners: [origin, top_right, bottom_right, bottom_left],
                color,
            });
        }
    }

    info!(
        "generated {} parcels of {:.3} x {:.3} m (gaps {:.3} / {:.3} m)",
        parcels.len(),
        dims.parcel_width,
        dims.parcel_height,
        dims.gap_x,
        dims.gap_y
    );

    Ok(Grid {
        parcels,
        parcel_width: dims.parcel_width,
        parcel_height: dims.parcel_height,
        gap_x: dims.gap_x,
        gap_y: dims.gap_y,
        count_x: spec.count_x,
        count_y: spec.count_y,
    })
}

/// Corner of the field used as the launch point.
pub fn home_point(quad: &FieldQuadrilateral) -> GeoPoint {
    quad.top_left
}
