use std::fmt;

use serde::{Deserialize, Serialize};

pub mod mission;
pub mod plan;
pub mod problem;
pub mod report;

/// Mean earth radius in meters. Everything in the workspace uses a sphere.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in meters (haversine).
    pub fn haversine_m(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Initial great-circle bearing towards `other`, radians clockwise from north.
    pub fn initial_bearing(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x)
    }

    /// Spherical direct problem: the point `distance_m` away along `bearing` (radians).
    pub fn destination(&self, distance_m: f64, bearing: f64) -> GeoPoint {
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();
        let delta = distance_m / EARTH_RADIUS_M;

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos()).asin();
        let lon2 = lon1
            + (bearing.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint {
            lat: lat2.to_degrees(),
            lon: lon2.to_degrees(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Opaque liquid tag. Holds a lowercase `#rrggbb` hex string or a named colour.
#[derive(Clone, Serialize, Deserialize, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub struct ColorId(String);

pub const UNASSIGNED_COLOR: &str = "white";

pub const DEFAULT_PALETTE: [&str; 6] = [
    "#ff0000", "#008000", "#0000ff", "#ffff00", "#00ffff", "#ff00ff",
];

impl ColorId {
    pub fn new(code: impl AsRef<str>) -> Self {
        let code = code.as_ref().trim().to_ascii_lowercase();
        let is_hex = code.len() == 6 && code.chars().all(|c| c.is_ascii_hexdigit());
        if is_hex {
            ColorId(format!("#{}", code))
        } else {
            ColorId(code)
        }
    }

    pub fn unassigned() -> Self {
        ColorId(UNASSIGNED_COLOR.to_string())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0 == UNASSIGNED_COLOR || self.0 == "#ffffff"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn default_palette() -> Vec<ColorId> {
        DEFAULT_PALETTE.iter().map(ColorId::new).collect()
    }

    pub fn display_name(&self) -> Option<&'static str> {
        let name = match self.0.as_str() {
            "#ff0000" => "Red",
            "#0000ff" => "Blue",
            "#ffff00" => "Yellow",
            "#00ffff" => "Cyan",
            "#ff00ff" => "Magenta",
            "#808080" => "Gray",
            "#8b0000" => "Dark red",
            "#006400" => "Dark green",
            "#00008b" => "Dark blue",
            "#b8860b" => "Dark yellow",
            "#ffffff" | UNASSIGNED_COLOR => "White",
            _ => return None,
        };
        Some(name)
    }
}

impl From<String> for ColorId {
    fn from(s: String) -> Self {
        ColorId::new(s)
    }
}

impl From<&str> for ColorId {
    fn from(s: &str) -> Self {
        ColorId::new(s)
    }
}

impl From<ColorId> for String {
    fn from(c: ColorId) -> Self {
        c.0
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
