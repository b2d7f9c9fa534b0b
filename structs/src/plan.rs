use serde::{Deserialize, Serialize};

use crate::{ColorId, GeoPoint};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    #[default]
    TopToBottom,
    BottomToTop,
}

/// One straight swath across a parcel, centred in its strip of the parcel width.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PassSegment {
    pub parcel: usize,
    pub index: usize,
    pub top: GeoPoint,
    pub bottom: GeoPoint,
}

impl PassSegment {
    /// Endpoints in flying order.
    pub fn oriented(&self, direction: Direction) -> (GeoPoint, GeoPoint) {
        match direction {
            Direction::TopToBottom => (self.top, self.bottom),
            Direction::BottomToTop => (self.bottom, self.top),
        }
    }
}

/// Spray-on and spray-off points of one flown pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PassEndpoints {
    pub parcel: usize,
    pub start: GeoPoint,
    pub end: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanPath {
    pub color: ColorId,
    /// Buffered flight path; two points per flown pass.
    pub path: Vec<GeoPoint>,
    pub unbuffered_points: Vec<PassEndpoints>,
    pub total_distance_m: f64,
}

/// A flown pass with its buffered approach and departure points.
#[derive(Debug, Clone, Copy)]
pub struct FlightLeg {
    pub approach: GeoPoint,
    pub spray_on: GeoPoint,
    pub spray_off: GeoPoint,
    pub depart: GeoPoint,
}

impl ScanPath {
    pub fn is_consistent(&self) -> bool {
        self.path.len() == 2 * self.unbuffered_points.len()
    }

    pub fn num_passes(&self) -> usize {
        self.unbuffered_points.len()
    }

    /// Legs in flying order. Truncates to the shorter list if inconsistent.
    pub fn legs(&self) -> impl Iterator<Item = FlightLeg> + '_ {
        self.path
            .chunks_exact(2)
            .zip(self.unbuffered_points.iter())
            .map(|(buffered, points)| FlightLeg {
                approach: buffered[0],
                spray_on: points.start,
                spray_off: points.end,
                depart: buffered[1],
            })
    }
}
