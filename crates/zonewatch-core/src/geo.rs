//! Great-circle distance between coordinates.

use crate::types::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in meters.
///
/// Pure and symmetric; `distance_m(a, a)` is exactly zero.
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn zero_distance_for_identical_points() {
        let p = coord(-6.2, 106.816);
        assert_eq!(distance_m(p, p), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = coord(-6.2, 106.816);
        let b = coord(-6.19, 106.82);
        let ab = distance_m(a, b);
        let ba = distance_m(b, a);
        assert!((ab - ba).abs() < 1e-9, "ab={ab} ba={ba}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = coord(0.0, 0.0);
        let b = coord(1.0, 0.0);
        let d = distance_m(a, b);
        assert!((d - 111_194.9).abs() < 10.0, "got {d}");
    }

    #[test]
    fn small_offset_near_jakarta() {
        // ~15 m north of the reference point used by the zone tests.
        let center = coord(-6.2, 106.816);
        let near = coord(-6.2 + 0.000_134_9, 106.816);
        let d = distance_m(center, near);
        assert!(d > 14.5 && d < 15.5, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let a = coord(0.0, 0.0);
        let b = coord(0.0, 180.0);
        let d = distance_m(a, b);
        let half = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half).abs() < 1.0, "got {d}, expected {half}");
    }
}
