use serde::{Deserialize, Serialize};

use crate::{problem::FitMode, ColorId, GeoPoint};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LayoutReport {
    pub parcel_width: f64,
    pub parcel_height: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    pub count_x: usize,
    pub count_y: usize,
    pub total_width: f64,
    pub total_height: f64,
    pub spray_width: f64,
    pub fit: FitMode,
    pub corners: [GeoPoint; 4],
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ParcelReport {
    pub id: usize,
    pub color: ColorId,
    pub color_name: String,
    pub liquid: String,
    pub corners: [GeoPoint; 4],
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LiquidReport {
    pub dose_l_ha: f64,
    pub nozzle_rate_l_min: f64,
    pub nozzle_count: u32,
    pub altitude_m: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PathReport {
    pub color: ColorId,
    pub color_name: String,
    pub liquid: String,
    pub parameters: Option<LiquidReport>,
    pub ground_speed_m_s: Option<f64>,
    pub total_distance_m: f64,
    /// Buffered (start, end) pairs in flying order.
    pub segments: Vec<(GeoPoint, GeoPoint)>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Report {
    pub layout: LayoutReport,
    pub parcels: Vec<ParcelReport>,
    pub paths: Vec<PathReport>,
    /// Non-fatal findings from layout and assignment checks.
    pub warnings: Vec<String>,
}
