//! Frame clock.
//!
//! `draw_web()` fires at whatever rate the browser likes. The economy wants
//! plain elapsed milliseconds per frame and does its own fixed stepping, so
//! this only turns absolute `performance.now()` stamps into deltas.

pub struct FrameClock {
    /// Timestamp of the previous frame (ms), None before the first frame.
    last_timestamp: Option<f64>,
    /// Sum of every delta handed out.
    pub elapsed_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_timestamp: None,
            elapsed_ms: 0.0,
        }
    }

    /// Feed the current timestamp; returns milliseconds since the last call.
    ///
    /// The first frame yields 0. Time running backwards yields 0 and
    /// re-anchors on the new timestamp.
    pub fn update(&mut self, now_ms: f64) -> f64 {
        if !now_ms.is_finite() {
            return 0.0;
        }
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);
        self.elapsed_ms += delta;
        delta
    }

    /// Timestamp of the latest frame as whole milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.last_timestamp.map_or(0, |t| t.max(0.0) as u64)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_zero() {
        let mut c = FrameClock::new();
        assert!((c.update(1_234.0) - 0.0).abs() < f64::EPSILON);
        assert_eq!(c.now_ms(), 1_234);
    }

    #[test]
    fn delta_between_frames() {
        let mut c = FrameClock::new();
        c.update(100.0);
        assert!((c.update(116.5) - 16.5).abs() < 1e-9);
        assert!((c.update(150.0) - 33.5).abs() < 1e-9);
        assert!((c.elapsed_ms - 50.0).abs() < 1e-9);
    }

    #[test]
    fn backwards_time_yields_zero() {
        let mut c = FrameClock::new();
        c.update(500.0);
        assert!((c.update(400.0) - 0.0).abs() < f64::EPSILON);
        // re-anchored on 400
        assert!((c.update(450.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn long_gap_is_not_clamped() {
        let mut c = FrameClock::new();
        c.update(0.0);
        assert!((c.update(60_000.0) - 60_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nan_timestamp_ignored() {
        let mut c = FrameClock::new();
        c.update(10.0);
        assert!((c.update(f64::NAN) - 0.0).abs() < f64::EPSILON);
        assert!((c.update(20.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn steady_60fps_sums_to_a_second() {
        let mut c = FrameClock::new();
        c.update(0.0);
        let total: f64 = (1..=60).map(|i| c.update(f64::from(i) * 1_000.0 / 60.0)).sum();
        assert!((total - 1_000.0).abs() < 1e-6);
    }
}
