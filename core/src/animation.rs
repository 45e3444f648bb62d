//! Time math for the return-to-center interpolation.
//!
//! The session here is pure: it turns a monotonic timestamp into an eased
//! percent-space position. Scheduling and cancellation live with the host,
//! which owns the single frame handle.

/// Duration of the return-to-center run after the pointer leaves.
pub const RETURN_DURATION_MS: f64 = 600.0;
/// Duration of the one-time settle run on first mount.
pub const SETTLE_DURATION_MS: f64 = 1500.0;
/// Settle start pose, in pixels from the card's right and top edges.
pub const SETTLE_X_OFFSET_PX: f64 = 70.0;
pub const SETTLE_Y_OFFSET_PX: f64 = 60.0;

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// One interpolation run from `start` to `target` in percent space.
/// At most one session exists at a time; the engine enforces this by
/// issuing a cancel before every start.
#[derive(Clone, Copy, Debug)]
pub struct ReturnSession {
    start_ms: f64,
    duration_ms: f64,
    start: (f64, f64),
    target: (f64, f64),
}

impl ReturnSession {
    pub fn new(start_ms: f64, duration_ms: f64, start: (f64, f64), target: (f64, f64)) -> Self {
        Self {
            start_ms,
            duration_ms,
            start,
            target,
        }
    }

    pub fn target(&self) -> (f64, f64) {
        self.target
    }

    /// Fraction of the run elapsed at `now_ms`, clamped to [0, 1]. A
    /// non-positive duration or a degenerate run (start == target) is
    /// complete immediately.
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 || self.start == self.target {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// The eased position at `now_ms` and whether the run has finished.
    pub fn sample(&self, now_ms: f64) -> ((f64, f64), bool) {
        let progress = self.progress(now_ms);
        let eased = ease_in_out_cubic(progress);
        let lerp = |from: f64, to: f64| from + (to - from) * eased;
        let position = (
            lerp(self.start.0, self.target.0),
            lerp(self.start.1, self.target.1),
        );
        (position, progress >= 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let delta = (actual - expected).abs();
        assert!(delta < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn easing_hits_the_canonical_points() {
        assert_close(ease_in_out_cubic(0.0), 0.0);
        assert_close(ease_in_out_cubic(0.25), 4.0 * 0.015625);
        assert_close(ease_in_out_cubic(0.5), 0.5);
        assert_close(ease_in_out_cubic(1.0), 1.0);
    }

    #[test]
    fn progress_is_clamped_and_monotonic() {
        let session = ReturnSession::new(1000.0, 600.0, (0.0, 0.0), (50.0, 50.0));
        assert_close(session.progress(500.0), 0.0);
        assert_close(session.progress(1300.0), 0.5);
        assert_close(session.progress(1600.0), 1.0);
        assert_close(session.progress(9999.0), 1.0);
        let mut last = 0.0;
        for step in 0..=20 {
            let progress = session.progress(1000.0 + step as f64 * 30.0);
            assert!(progress >= last);
            last = progress;
        }
    }

    #[test]
    fn sample_eases_between_start_and_target() {
        let session = ReturnSession::new(0.0, 600.0, (0.0, 100.0), (50.0, 50.0));
        let ((x, y), done) = session.sample(300.0);
        assert_close(x, 25.0);
        assert_close(y, 75.0);
        assert!(!done);
        let ((x, y), done) = session.sample(600.0);
        assert_close(x, 50.0);
        assert_close(y, 50.0);
        assert!(done);
    }

    #[test]
    fn degenerate_run_completes_on_first_sample() {
        let session = ReturnSession::new(0.0, 600.0, (50.0, 50.0), (50.0, 50.0));
        let ((x, y), done) = session.sample(0.0);
        assert_close(x, 50.0);
        assert_close(y, 50.0);
        assert!(done);
    }

    #[test]
    fn zero_duration_completes_on_first_sample() {
        let session = ReturnSession::new(0.0, 0.0, (10.0, 20.0), (50.0, 50.0));
        let ((x, y), done) = session.sample(0.0);
        assert_close(x, 50.0);
        assert_close(y, 50.0);
        assert!(done);
    }
}
