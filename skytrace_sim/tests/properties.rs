//! Property tests for the interpolator and the distance tracker.

use proptest::prelude::*;
use skytrace_core::config::{Point, VehicleType};
use skytrace_core::geo::{locate_along_path, path_length_m};
use skytrace_core::DistanceTracker;
use std::time::Duration;

fn arb_point() -> impl Strategy<Value = Point> {
    (-10.0f64..10.0, -10.0f64..10.0, 0.0f64..1000.0).prop_map(|(lon, lat, alt)| Point {
        lon,
        lat,
        alt,
    })
}

fn arb_path() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(arb_point(), 2..6)
}

proptest! {
    /// Any distance within the path resolves to a state whose altitude
    /// stays inside the path's altitude envelope.
    #[test]
    fn prop_locate_within_path(path in arb_path(), fraction in 0.0f64..0.999) {
        let total = path_length_m(&path);
        let d = total * fraction;

        let state = locate_along_path(&path, d, VehicleType::Uas)
            .expect("distance within path length must resolve");

        prop_assert!((state.distance_travelled - d).abs() < 1e-9);
        prop_assert!(state.heading >= 0.0 && state.heading < 360.0);

        let min_alt = path.iter().map(|p| p.alt).fold(f64::INFINITY, f64::min);
        let max_alt = path.iter().map(|p| p.alt).fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(state.position.alt >= min_alt - 1e-9);
        prop_assert!(state.position.alt <= max_alt + 1e-9);
    }

    /// Any distance beyond the total path length is end-of-path.
    #[test]
    fn prop_locate_past_end_is_none(path in arb_path(), excess in 0.001f64..1e6) {
        let total = path_length_m(&path);
        prop_assert!(locate_along_path(&path, total + excess, VehicleType::Uas).is_none());
    }

    /// The distance function is continuous across any sequence of
    /// pause/resume/speed-change operations, and never decreases.
    #[test]
    fn prop_tracker_continuity(
        initial_speed in 0.1f64..100.0,
        ops in prop::collection::vec(
            prop_oneof![
                (1u64..10_000).prop_map(Op::Advance),
                Just(Op::Pause),
                Just(Op::Resume),
                (0.1f64..100.0).prop_map(Op::ChangeSpeed),
            ],
            1..40,
        ),
    ) {
        let mut tracker = DistanceTracker::new(initial_speed);
        let mut now = Duration::ZERO;
        let mut playing = true;
        tracker.start(now);
        let mut last_distance = 0.0f64;

        for op in ops {
            match op {
                Op::Advance(ms) => {
                    now += Duration::from_millis(ms);
                }
                Op::Pause => {
                    if playing {
                        let before = tracker.distance_at(now);
                        tracker.pause(now);
                        prop_assert!((tracker.offset_m() - before).abs() < 1e-9);
                        playing = false;
                    }
                }
                Op::Resume => {
                    if !playing {
                        let frozen = tracker.offset_m();
                        tracker.start(now);
                        prop_assert!((tracker.distance_at(now) - frozen).abs() < 1e-9);
                        playing = true;
                    }
                }
                Op::ChangeSpeed(speed) => {
                    if playing {
                        let before = tracker.distance_at(now);
                        tracker.change_speed(speed, now);
                        let after = tracker.distance_at(now);
                        prop_assert!((before - after).abs() < 1e-9);
                    } else {
                        tracker.set_speed(speed);
                    }
                }
            }

            let current = if playing {
                tracker.distance_at(now)
            } else {
                tracker.offset_m()
            };
            prop_assert!(current >= last_distance - 1e-9);
            last_distance = current;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Advance(u64),
    Pause,
    Resume,
    ChangeSpeed(f64),
}
