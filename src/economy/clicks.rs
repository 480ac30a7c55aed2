//! Manual click bookkeeping: recent-click rate and threshold awards.

use std::collections::VecDeque;

/// Window for the clicks-per-second figure.
pub const RATE_WINDOW_MS: u64 = 1_000;

/// Sliding-window click-rate estimator.
///
/// Timestamps are kept in click order and pruned lazily on every click and
/// every rate query, so nothing older than the retention window survives a
/// call.
#[derive(Clone, Debug)]
pub struct ManualClickTracker {
    timestamps: VecDeque<u64>,
    retention_ms: u64,
}

impl ManualClickTracker {
    pub fn new(retention_ms: u64) -> Self {
        Self {
            timestamps: VecDeque::new(),
            // Never retain less than the rate window, or the rate undercounts.
            retention_ms: retention_ms.max(RATE_WINDOW_MS),
        }
    }

    pub fn record_click(&mut self, now_ms: u64) {
        self.prune(now_ms);
        self.timestamps.push_back(now_ms);
    }

    /// Clicks in the last second times `per_click_value`.
    pub fn current_rate_per_second(&mut self, now_ms: u64, per_click_value: f64) -> f64 {
        self.prune(now_ms);
        let recent = self
            .timestamps
            .iter()
            .filter(|&&ts| now_ms.saturating_sub(ts) <= RATE_WINDOW_MS)
            .count();
        recent as f64 * per_click_value
    }

    pub fn retained(&self) -> usize {
        self.timestamps.len()
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
    }

    fn prune(&mut self, now_ms: u64) {
        while let Some(&oldest) = self.timestamps.front() {
            if now_ms.saturating_sub(oldest) >= self.retention_ms {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Fill counter where only every N-th click pays out.
#[derive(Clone, Debug)]
pub struct ThresholdClicker {
    progress: u32,
    threshold: u32,
}

impl ThresholdClicker {
    /// A fresh clicker sits one click short of the threshold, so the first
    /// click of a session awards immediately.
    pub fn new(threshold: u32) -> Self {
        let threshold = threshold.max(1);
        Self {
            progress: threshold - 1,
            threshold,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Fill level in `[0, 1)` for display.
    pub fn fill_fraction(&self) -> f64 {
        f64::from(self.progress) / f64::from(self.threshold)
    }

    /// Register one click. Returns `true` when this click completes the fill.
    pub fn click(&mut self) -> bool {
        self.progress += 1;
        if self.progress >= self.threshold {
            self.progress = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.progress = self.threshold - 1;
    }
}
