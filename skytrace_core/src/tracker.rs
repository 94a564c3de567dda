//! Clock-to-distance bookkeeping.
//!
//! Converts elapsed wall-clock time and the configured ground speed into
//! total distance travelled along the path. Pauses and speed changes are
//! absorbed by snapshotting the current distance into an offset, so the
//! distance function stays continuous across any sequence of transitions.

use std::time::Duration;

/// Tracks distance travelled as a function of time and speed.
///
/// The sole formula, used by every tick and by pause/speed-change
/// bookkeeping, is:
///
/// ```text
/// distance(now) = offset + (now - start_time) * speed
/// ```
#[derive(Debug, Clone)]
pub struct DistanceTracker {
    /// Monotonic time reference of the current PLAYING interval.
    start_time: Duration,

    /// Distance accumulated before the current PLAYING interval began.
    dist_offset_m: f64,

    /// Current ground speed in m/s.
    speed_ms: f64,
}

impl DistanceTracker {
    pub fn new(speed_ms: f64) -> Self {
        Self {
            start_time: Duration::ZERO,
            dist_offset_m: 0.0,
            speed_ms,
        }
    }

    /// Starts (or restarts) the time reference at `now`.
    ///
    /// Does not touch the offset: it is 0 on a fresh stopped->playing
    /// transition and carries the paused distance on paused->playing.
    pub fn start(&mut self, now: Duration) {
        self.start_time = now;
    }

    /// Total distance travelled at `now`, in meters.
    pub fn distance_at(&self, now: Duration) -> f64 {
        let elapsed = now.saturating_sub(self.start_time);
        self.dist_offset_m + elapsed.as_secs_f64() * self.speed_ms
    }

    /// Freezes the current distance into the offset.
    pub fn pause(&mut self, now: Duration) {
        self.dist_offset_m = self.distance_at(now);
    }

    /// Adopts a new speed mid-flight without a position jump.
    ///
    /// Snapshots the distance under the old speed, rebases the time
    /// reference to `now`, then switches speed; distance computed just
    /// before and just after this call is identical.
    pub fn change_speed(&mut self, new_speed_ms: f64, now: Duration) {
        self.dist_offset_m = self.distance_at(now);
        self.start_time = now;
        self.speed_ms = new_speed_ms;
    }

    /// Adopts a new speed without touching the offset.
    ///
    /// For use while the clock is not running (paused/stopped): the frozen
    /// offset already holds the full distance, so no snapshot is needed and
    /// the new speed has no retroactive effect on elapsed pause time.
    pub fn set_speed(&mut self, new_speed_ms: f64) {
        self.speed_ms = new_speed_ms;
    }

    /// Clears accumulated distance (loop back to path start, or full stop).
    pub fn reset(&mut self) {
        self.dist_offset_m = 0.0;
    }

    pub fn speed_ms(&self) -> f64 {
        self.speed_ms
    }

    /// Distance currently frozen in the offset.
    pub fn offset_m(&self) -> f64 {
        self.dist_offset_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SECS: fn(u64) -> Duration = Duration::from_secs;

    #[test]
    fn test_distance_grows_linearly() {
        let mut tracker = DistanceTracker::new(10.0);
        tracker.start(SECS(100));

        assert_relative_eq!(tracker.distance_at(SECS(100)), 0.0);
        assert_relative_eq!(tracker.distance_at(SECS(101)), 10.0);
        assert_relative_eq!(tracker.distance_at(SECS(110)), 100.0);
    }

    #[test]
    fn test_pause_resume_is_continuous() {
        let mut tracker = DistanceTracker::new(5.0);
        tracker.start(SECS(0));

        let before = tracker.distance_at(SECS(4));
        tracker.pause(SECS(4));
        assert_relative_eq!(tracker.offset_m(), before);

        // Resume 10s later; elapsed pause time must not count.
        tracker.start(SECS(14));
        assert_relative_eq!(tracker.distance_at(SECS(14)), before);
        assert_relative_eq!(tracker.distance_at(SECS(16)), before + 10.0);
    }

    #[test]
    fn test_change_speed_is_continuous() {
        let mut tracker = DistanceTracker::new(10.0);
        tracker.start(SECS(0));

        let before = tracker.distance_at(SECS(3));
        tracker.change_speed(2.0, SECS(3));
        let after = tracker.distance_at(SECS(3));
        assert_relative_eq!(before, after);

        // New speed applies from the change point
        assert_relative_eq!(tracker.distance_at(SECS(5)), before + 4.0);
    }

    #[test]
    fn test_set_speed_while_frozen_has_no_retroactive_effect() {
        let mut tracker = DistanceTracker::new(10.0);
        tracker.start(SECS(0));
        tracker.pause(SECS(2));
        let frozen = tracker.offset_m();

        tracker.set_speed(100.0);
        tracker.start(SECS(60));
        assert_relative_eq!(tracker.distance_at(SECS(60)), frozen);
        assert_relative_eq!(tracker.distance_at(SECS(61)), frozen + 100.0);
    }

    #[test]
    fn test_reset_clears_offset() {
        let mut tracker = DistanceTracker::new(10.0);
        tracker.start(SECS(0));
        tracker.pause(SECS(5));
        assert!(tracker.offset_m() > 0.0);

        tracker.reset();
        tracker.start(SECS(20));
        assert_relative_eq!(tracker.distance_at(SECS(20)), 0.0);
    }

    #[test]
    fn test_monotonic_for_fixed_speed() {
        let mut tracker = DistanceTracker::new(3.0);
        tracker.start(SECS(0));
        let mut last = -1.0;
        for t in 0..20 {
            let d = tracker.distance_at(Duration::from_millis(t * 500));
            assert!(d >= last);
            last = d;
        }
    }
}
