use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ColorId, GeoPoint};

/// Explicit colour per parcel id, as produced by an operator painting the grid.
pub type ColorAssignment = BTreeMap<usize, ColorId>;

/// Field corners in the order top-left, top-right, bottom-right, bottom-left.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FieldQuadrilateral {
    pub top_left: GeoPoint,
    pub top_right: GeoPoint,
    pub bottom_right: GeoPoint,
    pub bottom_left: GeoPoint,
}

impl FieldQuadrilateral {
    pub fn corners(&self) -> [GeoPoint; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn center(&self) -> GeoPoint {
        let c = self.corners();
        GeoPoint {
            lat: c.iter().map(|p| p.lat).sum::<f64>() / 4.0,
            lon: c.iter().map(|p| p.lon).sum::<f64>() / 4.0,
        }
    }

    /// True unless two opposite edges cross each other. Planar test in (lon, lat).
    pub fn is_simple(&self) -> bool {
        let [tl, tr, br, bl] = self.corners();
        !segments_cross(tl, tr, br, bl) && !segments_cross(tr, br, bl, tl)
    }
}

fn orientation(a: GeoPoint, b: GeoPoint, c: GeoPoint) -> f64 {
    (b.lon - a.lon) * (c.lat - a.lat) - (b.lat - a.lat) * (c.lon - a.lon)
}

fn segments_cross(a: GeoPoint, b: GeoPoint, c: GeoPoint, d: GeoPoint) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum FitMode {
    #[default]
    NoFit,
    /// Scale parcels and gaps by the same factor.
    FitScaleBoth,
    /// Scale only the gaps; parcels keep their requested size.
    FitPreserveParcelSize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParcelSpec {
    pub parcel_width: f64,
    pub parcel_height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub count_x: usize,
    pub count_y: usize,
    pub fit: FitMode,
    /// Cycled over parcel ids when no explicit assignment is given.
    #[serde(default)]
    pub colors: Vec<ColorId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Parcel {
    pub id: usize,
    /// TL, TR, BR, BL.
    pub corners: [GeoPoint; 4],
    pub color: ColorId,
}

impl Parcel {
    pub fn top_left(&self) -> GeoPoint {
        self.corners[0]
    }
    pub fn top_right(&self) -> GeoPoint {
        self.corners[1]
    }
    pub fn bottom_right(&self) -> GeoPoint {
        self.corners[2]
    }
    pub fn bottom_left(&self) -> GeoPoint {
        self.corners[3]
    }

    pub fn row(&self, count_x: usize) -> usize {
        self.id / count_x
    }
    pub fn col(&self, count_x: usize) -> usize {
        self.id % count_x
    }
}

/// Generated grid together with the dimensions that were actually laid out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Grid {
    pub parcels: Vec<Parcel>,
    pub parcel_width: f64,
    pub parcel_height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub count_x: usize,
    pub count_y: usize,
}

impl Grid {
    pub fn total_width(&self) -> f64 {
        layout_extent(self.count_x, self.parcel_width, self.gap_x)
    }
    pub fn total_height(&self) -> f64 {
        layout_extent(self.count_y, self.parcel_height, self.gap_y)
    }

    pub fn parcels_with_color<'a>(&'a self, color: &'a ColorId) -> impl Iterator<Item = &'a Parcel> {
        self.parcels.iter().filter(move |p| &p.color == color)
    }
}

/// `count*(size+gap) - gap`, the span of `count` cells with gaps between them.
pub fn layout_extent(count: usize, size: f64, gap: f64) -> f64 {
    count as f64 * (size + gap) - gap
}
