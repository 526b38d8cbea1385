//! Idle-detection state machine.
//!
//! Tracks a single last-activity timestamp rather than an explicit idle
//! flag. A periodic check compares the elapsed time against the configured
//! threshold; when it fires, the timestamp resets so consecutive idle
//! periods report as separate, non-overlapping intervals.

/// Cadence at which the live capture loop ticks the detector.
pub const IDLE_CHECK_INTERVAL_MS: i64 = 1_000;

/// Detects inactivity periods at least as long as a configured threshold.
///
/// The threshold is read once from settings when the capture session starts
/// and is not hot-reloaded mid-session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleDetector {
    threshold_ms: i64,
    last_activity_ts: i64,
}

impl IdleDetector {
    /// Creates a detector with activity marked at `now_ms`.
    #[must_use]
    pub const fn new(threshold_ms: i64, now_ms: i64) -> Self {
        Self {
            threshold_ms,
            last_activity_ts: now_ms,
        }
    }

    /// Records qualifying activity. Emits nothing by itself.
    pub const fn mark_activity(&mut self, now_ms: i64) {
        self.last_activity_ts = now_ms;
    }

    /// Runs one periodic check.
    ///
    /// Returns the elapsed inactivity duration when it is at least the
    /// threshold, resetting the activity timestamp so the same idle span is
    /// never reported twice. Returns `None` otherwise.
    pub const fn tick(&mut self, now_ms: i64) -> Option<i64> {
        let idle_ms = now_ms - self.last_activity_ts;
        if idle_ms >= self.threshold_ms {
            self.last_activity_ts = now_ms;
            return Some(idle_ms);
        }
        None
    }

    /// The configured idle threshold.
    #[must_use]
    pub const fn threshold_ms(&self) -> i64 {
        self.threshold_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_idle_before_threshold() {
        let mut detector = IdleDetector::new(5_000, 0);
        for now in (1_000..5_000).step_by(1_000) {
            assert_eq!(detector.tick(now), None);
        }
    }

    #[test]
    fn idle_fires_at_threshold_and_resets() {
        let mut detector = IdleDetector::new(5_000, 0);
        assert_eq!(detector.tick(5_000), Some(5_000));
        // Reset point moved to 5000; the next tick measures from there.
        assert_eq!(detector.tick(6_000), None);
    }

    #[test]
    fn twelve_seconds_of_inactivity_reports_two_periods() {
        // Ticks every second with no activity: exactly two idle events at
        // ~5s and ~10s, each measured from the previous reset point.
        let mut detector = IdleDetector::new(5_000, 0);
        let mut reported = Vec::new();
        for now in (1_000..=12_000).step_by(1_000) {
            if let Some(idle_ms) = detector.tick(now) {
                reported.push((now, idle_ms));
            }
        }
        assert_eq!(reported, vec![(5_000, 5_000), (10_000, 5_000)]);
    }

    #[test]
    fn activity_resets_the_clock() {
        let mut detector = IdleDetector::new(5_000, 0);
        assert_eq!(detector.tick(4_000), None);
        detector.mark_activity(4_500);
        assert_eq!(detector.tick(5_000), None);
        assert_eq!(detector.tick(9_500), Some(5_000));
    }

    #[test]
    fn late_tick_reports_full_elapsed_duration() {
        // A delayed check still measures from the last activity, not from
        // the threshold boundary.
        let mut detector = IdleDetector::new(5_000, 0);
        assert_eq!(detector.tick(8_200), Some(8_200));
    }
}
