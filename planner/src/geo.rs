use sprayplan_structs::GeoPoint;

/// Direction of a grid axis from `from` to `to`, as `atan2(Δlon, Δlat)` in
/// raw degree differences. A planar approximation, only meaningful at field
/// scale, used as a bearing for [`GeoPoint::destination`].
pub fn grid_axis_bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    (to.lon - from.lon).atan2(to.lat - from.lat)
}

/// Linear interpolation in lat/lon. `factor` 0 gives `a`, 1 gives `b`.
pub fn lerp(a: &GeoPoint, b: &GeoPoint, factor: f64) -> GeoPoint {
    GeoPoint {
        lat: a.lat + factor * (b.lat - a.lat),
        lon: a.lon + factor * (b.lon - a.lon),
    }
}

/// Extends the segment `start -> end` by `distance_m` on both ends.
///
/// Both extensions use the initial bearing at `start`: the new start lies
/// behind `start` (bearing + pi), the new end lies ahead of `end`.
pub fn extend_segment(start: &GeoPoint, end: &GeoPoint, distance_m: f64) -> (GeoPoint, GeoPoint) {
    let bearing = start.initial_bearing(end);
    (
        start.destination(distance_m, bearing + std::f64::consts::PI),
        end.destination(distance_m, bearing),
    )
}

/// Sum of haversine distances between consecutive points.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].haversine_m(&w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_extends_along_the_pass() {
        let start = GeoPoint::new(37.32500, -6.02884);
        let end = start.destination(5.0, 2.5);
        let (s, e) = extend_segment(&start, &end, 2.0);

        assert!((s.haversine_m(&start) - 2.0).abs() < 1e-6);
        assert!((e.haversine_m(&end) - 2.0).abs() < 1e-6);
        assert!((s.haversine_m(&e) - 9.0).abs() < 1e-4);
    }

    #[test]
    fn zero_buffer_keeps_points() {
        let start = GeoPoint::new(37.32500, -6.02884);
        let end = GeoPoint::new(37.32466, -6.02899);
        let (s, e) = extend_segment(&start, &end, 0.0);
        assert!(s.haversine_m(&start) < 1e-9);
        assert!(e.haversine_m(&end) < 1e-9);
    }

    #[test]
    fn lerp_endpoints() {
        let a = GeoPoint::new(1.0, 2.0);
        let b = GeoPoint::new(3.0, 6.0);
        assert_eq!(lerp(&a, &b, 0.0), a);
        assert_eq!(lerp(&a, &b, 1.0), b);
        assert_eq!(lerp(&a, &b, 0.5), GeoPoint::new(2.0, 4.0));
    }

    #[test]
    fn path_length_sums_legs() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 0.001);
        let c = GeoPoint::new(0.001, 0.001);
        let total = path_length(&[a, b, c]);
        assert!((total - (a.haversine_m(&b) + b.haversine_m(&c))).abs() < 1e-9);
        assert_eq!(path_length(&[a]), 0.0);
        assert_eq!(path_length(&[]), 0.0);
    }
}
