//! Geodesic path interpolation.
//!
//! Pure functions mapping (path, distance travelled) to a vehicle state.
//! Segments are great-circle legs; positions along a segment come from the
//! haversine destination formula, altitudes from linear interpolation over
//! the fractional progress within the segment.

use crate::config::{Path, Point, VehicleState, VehicleType};
use geo::{HaversineBearing, HaversineDestination, HaversineDistance, Point as GeoPoint};

fn to_geo(point: &Point) -> GeoPoint<f64> {
    GeoPoint::new(point.lon, point.lat)
}

fn lerp(from: f64, to: f64, i: f64) -> f64 {
    from + (to - from) * i
}

/// Normalizes a bearing in degrees to [0, 360).
fn normalize_heading(bearing_deg: f64) -> f64 {
    let heading = bearing_deg.rem_euclid(360.0);
    // rem_euclid of a tiny negative rounds up to exactly 360.0
    if heading >= 360.0 {
        0.0
    } else {
        heading
    }
}

/// Great-circle length of one segment in meters.
pub fn segment_length_m(from: &Point, to: &Point) -> f64 {
    to_geo(from).haversine_distance(&to_geo(to))
}

/// Total great-circle length of a path in meters.
///
/// Zero for paths with fewer than 2 points.
pub fn path_length_m(path: &Path) -> f64 {
    path.windows(2)
        .map(|pair| segment_length_m(&pair[0], &pair[1]))
        .sum()
}

/// Locates the vehicle state a given distance along a path.
///
/// Walks the segments in order, consuming `distance_travelled` meters;
/// the state lands on the first segment longer than the distance left.
/// Returns `None` once the distance exceeds the total path length
/// (end of path), which is also the result for paths with fewer than
/// 2 points.
///
/// Negative distances are a caller bug; they assert in debug builds and
/// clamp to 0 otherwise.
pub fn locate_along_path(
    path: &Path,
    distance_travelled: f64,
    vehicle_type: VehicleType,
) -> Option<VehicleState> {
    debug_assert!(
        distance_travelled >= 0.0,
        "negative distance travelled: {distance_travelled}"
    );
    let distance_travelled = distance_travelled.max(0.0);
    let mut dist_remaining = distance_travelled;

    for pair in path.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let seg_len = segment_length_m(from, to);

        // Duplicate consecutive waypoints produce a zero-length segment;
        // never divide by it.
        if seg_len == 0.0 {
            if dist_remaining == 0.0 {
                return Some(VehicleState {
                    position: *to,
                    heading: 0.0,
                    distance_travelled,
                    vehicle_type,
                });
            }
            continue;
        }

        if dist_remaining <= seg_len {
            let bearing = to_geo(from).haversine_bearing(to_geo(to));
            let dest = to_geo(from).haversine_destination(bearing, dist_remaining);
            let alt = lerp(from.alt, to.alt, dist_remaining / seg_len);

            return Some(VehicleState {
                position: Point::new(dest.x(), dest.y(), alt),
                heading: normalize_heading(bearing),
                distance_travelled,
                vehicle_type,
            });
        }

        dist_remaining -= seg_len;
    }

    // Past the last segment: end of path.
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn northbound_path() -> Path {
        // ~111m due north along the prime meridian, climbing 0m -> 100m.
        vec![Point::new(0.0, 0.0, 0.0), Point::new(0.0, 0.001, 100.0)]
    }

    #[test]
    fn test_path_length_matches_segment_sum() {
        let path = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.001, 0.0, 0.0),
            Point::new(0.001, 0.001, 0.0),
        ];
        let total = path_length_m(&path);
        let by_segment = segment_length_m(&path[0], &path[1]) + segment_length_m(&path[1], &path[2]);
        assert_relative_eq!(total, by_segment, max_relative = 1e-12);
        // 0.001 deg is roughly 111m at the equator
        assert!(total > 200.0 && total < 250.0);
    }

    #[test]
    fn test_locate_midway_interpolates_position_and_altitude() {
        let path = northbound_path();
        let total = path_length_m(&path);

        let state = locate_along_path(&path, total / 2.0, VehicleType::Uas).unwrap();
        assert_abs_diff_eq!(state.position.lon, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.position.lat, 0.0005, epsilon = 1e-7);
        assert_relative_eq!(state.position.alt, 50.0, max_relative = 1e-6);
        // Heading due north
        assert_abs_diff_eq!(state.heading, 0.0, epsilon = 1e-6);
        assert_relative_eq!(state.distance_travelled, total / 2.0);
    }

    #[test]
    fn test_locate_at_start_and_vertex() {
        let path = northbound_path();
        let total = path_length_m(&path);

        let start = locate_along_path(&path, 0.0, VehicleType::Uas).unwrap();
        assert_abs_diff_eq!(start.position.lat, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(start.position.alt, 0.0, epsilon = 1e-12);

        // Exactly on the final vertex still resolves (<=, not <)
        let end = locate_along_path(&path, total, VehicleType::Uas).unwrap();
        assert_abs_diff_eq!(end.position.lat, 0.001, epsilon = 1e-7);
        assert_relative_eq!(end.position.alt, 100.0, max_relative = 1e-9);
    }

    #[test]
    fn test_locate_past_end_returns_none() {
        let path = northbound_path();
        let total = path_length_m(&path);
        assert!(locate_along_path(&path, total + 0.001, VehicleType::Uas).is_none());
        assert!(locate_along_path(&path, total * 10.0, VehicleType::Uas).is_none());
    }

    #[test]
    fn test_short_paths_are_end_of_path() {
        assert!(locate_along_path(&vec![], 0.0, VehicleType::Uas).is_none());
        let single = vec![Point::new(0.0, 0.0, 0.0)];
        assert!(locate_along_path(&single, 0.0, VehicleType::Uas).is_none());
    }

    #[test]
    fn test_zero_length_segment_is_skipped() {
        let dup = Point::new(0.0, 0.0005, 40.0);
        let path = vec![
            Point::new(0.0, 0.0, 0.0),
            dup,
            dup,
            Point::new(0.0, 0.001, 100.0),
        ];
        let total = path_length_m(&path);

        // Distance landing past the duplicate must advance onto the last leg.
        let state = locate_along_path(&path, total * 0.75, VehicleType::Uas).unwrap();
        assert!(state.position.lat > 0.0005);
        assert!(state.position.alt > 40.0 && state.position.alt < 100.0);
    }

    #[test]
    fn test_exactly_on_zero_length_segment_falls_back_to_endpoint() {
        // Path starting with a duplicate waypoint: distance 0 sits on the
        // zero-length segment and resolves to its endpoint values.
        let dup = Point::new(0.0, 0.0, 50.0);
        let path = vec![dup, dup, Point::new(0.0, 0.001, 100.0)];

        let state = locate_along_path(&path, 0.0, VehicleType::Uas).unwrap();
        assert_relative_eq!(state.position.alt, 50.0, max_relative = 1e-9);
        assert_abs_diff_eq!(state.heading, 0.0);

        // Landing exactly on the final vertex after a duplicate still works.
        let tail = Point::new(0.0, 0.001, 80.0);
        let path = vec![Point::new(0.0, 0.0, 0.0), tail, tail];
        let total = path_length_m(&path);
        let state = locate_along_path(&path, total, VehicleType::Uas).unwrap();
        assert_relative_eq!(state.position.alt, 80.0, max_relative = 1e-9);
    }

    #[test]
    fn test_heading_normalized_to_0_360() {
        // Westbound leg: turf-style bearing is -90, normalized to 270.
        let path = vec![Point::new(0.001, 0.0, 0.0), Point::new(0.0, 0.0, 0.0)];
        let state = locate_along_path(&path, 1.0, VehicleType::Uas).unwrap();
        assert_abs_diff_eq!(state.heading, 270.0, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_distance_clamps_in_release() {
        // debug_assert fires in debug builds; release behavior clamps to 0.
        if cfg!(debug_assertions) {
            return;
        }
        let path = northbound_path();
        let state = locate_along_path(&path, -5.0, VehicleType::Uas).unwrap();
        assert_abs_diff_eq!(state.distance_travelled, 0.0);
    }
}
