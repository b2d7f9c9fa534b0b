use log::{debug, info, trace};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use sprayplan_structs::{
    plan::{Direction, PassEndpoints, PassSegment, ScanPath},
    problem::Parcel,
    ColorId, GeoPoint,
};
use tinyvec::TinyVec;

use crate::{
    error::{positive, PlanError},
    geo::{extend_segment, lerp},
};

pub use crate::geo::path_length;

/// Relative slack allowed when checking that the spray width divides the
/// parcel width, so that ratios like 2.9999999999 still count as 3 passes.
pub const DIVISION_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SprayPattern {
    /// Effective (post-fit) parcel width.
    pub parcel_width: f64,
    pub spray_width: f64,
    pub acceleration_buffer_m: f64,
}

/// A pass chosen by an ordering, with its buffered flight endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Leg {
    pub node: usize,
    pub direction: Direction,
    pub approach: GeoPoint,
    pub depart: GeoPoint,
}

/// Orders every pass exactly once. Receives the pass list and the
/// acceleration buffer distance.
pub type PassOrdering = fn(&[PassSegment], f64) -> Vec<Leg>;

pub fn num_passes(parcel_width: f64, spray_width: f64) -> Result<usize, PlanError> {
    positive("parcel_width", parcel_width)?;
    positive("spray_width", spray_width)?;

    let ratio = parcel_width / spray_width;
    let nearest = ratio.round();
    if nearest < 1.0 || (ratio - nearest).abs() > DIVISION_TOLERANCE * nearest {
        return Err(PlanError::UnevenDivision {
            parcel_width,
            spray_width,
        });
    }
    Ok(nearest as usize)
}

/// Pass `k` runs through the centre of the `k`-th strip of width `spray_width`.
pub fn pass_segments(
    parcel: &Parcel,
    passes: usize,
    spray_width: f64,
    parcel_width: f64,
) -> TinyVec<[PassSegment; 8]> {
    (0..passes)
        .map(|k| {
            let factor = (k as f64 + 0.5) * spray_width / parcel_width;
            PassSegment {
                parcel: parcel.id,
                index: k,
                top: lerp(&parcel.top_left(), &parcel.top_right(), factor),
                bottom: lerp(&parcel.bottom_left(), &parcel.bottom_right(), factor),
            }
        })
        .collect()
}

fn fly(nodes: &[PassSegment], node: usize, direction: Direction, buffer_m: f64) -> Leg {
    let (start, end) = nodes[node].oriented(direction);
    let (approach, depart) = extend_segment(&start, &end, buffer_m);
    Leg {
        node,
        direction,
        approach,
        depart,
    }
}

/// Greedy open tour. Starts with pass 0 flown top to bottom, then repeatedly
/// flies the unvisited pass whose nearer end is closest to the current
/// buffered position. Ties keep the lowest pass index; equal end distances
/// fly bottom to top.
pub fn nearest_neighbour(nodes: &[PassSegment], buffer_m: f64) -> Vec<Leg> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let mut visited = vec![false; nodes.len()];
    let mut legs = Vec::with_capacity(nodes.len());

    visited[0] = true;
    legs.push(fly(nodes, 0, Direction::TopToBottom, buffer_m));
    let mut current = legs[0].depart;

    for _ in 1..nodes.len() {
        let next = nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| !visited[*i])
            .map(|(i, node)| {
                let to_top = current.haversine_m(&node.top);
                let to_bottom = current.haversine_m(&node.bottom);
                if to_top < to_bottom {
                    (i, Direction::TopToBottom, to_top)
                } else {
                    (i, Direction::BottomToTop, to_bottom)
                }
            })
            .min_by_key(|(_, _, d)| OrderedFloat(*d));

        let Some((node, direction, dist)) = next else {
            break;
        };
        trace!(
            "pass {} (parcel {}) {:?}, transit {:.3} m",
            node,
            nodes[node].parcel,
            direction,
            dist
        );

        visited[node] = true;
        let leg = fly(nodes, node, direction, buffer_m);
        current = leg.depart;
        legs.push(leg);
    }

    legs
}

/// Coverage path over every parcel tagged `color`, using [`nearest_neighbour`].
pub fn plan(parcels: &[Parcel], color: &ColorId, pattern: &SprayPattern) -> Result<ScanPath, PlanError> {
    plan_with(parcels, color, pattern, nearest_neighbour)
}

pub fn plan_with(
    parcels: &[Parcel],
    color: &ColorId,
    pattern: &SprayPattern,
    ordering: PassOrdering,
) -> Result<ScanPath, PlanError> {
    #[cfg(feature = "prof")]
    let _p = hprof::enter("plan");
    if parcels.is_empty() {
        return Err(PlanError::NoParcels);
    }

    let matching = parcels.iter().filter(|p| &p.color == color).collect::<Vec<_>>();
    if matching.is_empty() {
        return Err(PlanError::NoMatchingColor(color.clone()));
    }

    let passes = num_passes(pattern.parcel_width, pattern.spray_width)?;
    let buffer = pattern.acceleration_buffer_m;
    if !buffer.is_finite() || buffer < 0.0 {
        return Err(PlanError::InvalidInput {
            name: "acceleration_buffer_m",
            value: buffer,
        });
    }

    let nodes = matching
        .iter()
        .flat_map(|p| pass_segments(p, passes, pattern.spray_width, pattern.parcel_width))
        .collect::<Vec<_>>();
    debug!(
        "color {}: {} parcels, {} passes each, {} nodes",
        color,
        matching.len(),
        passes,
        nodes.len()
    );

    let legs = ordering(&nodes, buffer);

    let mut path = Vec::with_capacity(2 * legs.len());
    let mut unbuffered_points = Vec::with_capacity(legs.len());
    for leg in legs.iter() {
        let node = &nodes[leg.node];
        let (start, end) = node.oriented(leg.direction);
        path.push(leg.approach);
        path.push(leg.depart);
        unbuffered_points.push(PassEndpoints {
            parcel: node.parcel,
            start,
            end,
        });
    }

    let total_distance_m = path_length(&path);
    info!(
        "color {}: {} passes, total path length {:.2} m",
        color,
        unbuffered_points.len(),
        total_distance_m
    );

    Ok(ScanPath {
        color: color.clone(),
        path,
        unbuffered_points,
        total_distance_m,
    })
}
