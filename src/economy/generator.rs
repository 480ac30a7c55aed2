//! Delta-time production engine for automatic generators.
//!
//! The host's frame callback arrives at a variable rate. Incoming time is
//! accumulated and consumed in fixed steps so the credited total depends only
//! on elapsed time, never on how that time was sliced into frames. Step size
//! shrinks with unit count (small fleets tick visibly, like clicks) down to a
//! floor used for large fleets.

use super::resource::{Resource, ResourceId};

/// Tuning shared by every generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepPolicy {
    /// Smallest step in seconds (0.02 s = at most 50 credits per second).
    pub min_step: f64,
    /// Counts above this always use `min_step`.
    pub batch_threshold: u64,
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self {
            min_step: 0.02,
            batch_threshold: 50,
        }
    }
}

impl StepPolicy {
    /// Largest step allowed for `units` owned units.
    pub fn max_step(&self, units: u64) -> f64 {
        if units == 0 || units > self.batch_threshold {
            self.min_step
        } else {
            (1.0 / (units as f64 * 2.0)).max(self.min_step)
        }
    }
}

/// N owned units producing `base_rate` of one currency per second each.
#[derive(Clone, Debug)]
pub struct AutoGenerator {
    target: ResourceId,
    units_owned: u64,
    base_rate: f64,
    policy: StepPolicy,
    /// Seconds received but not yet credited.
    accumulated_time: f64,
    /// Production credited since `rate_anchor_ms`.
    production_counter: f64,
    rate_anchor_ms: Option<u64>,
    production_per_second: f64,
}

impl AutoGenerator {
    pub fn new(target: ResourceId, base_rate: f64, policy: StepPolicy) -> Self {
        Self {
            target,
            units_owned: 0,
            base_rate,
            policy,
            accumulated_time: 0.0,
            production_counter: 0.0,
            rate_anchor_ms: None,
            production_per_second: 0.0,
        }
    }

    pub fn units_owned(&self) -> u64 {
        self.units_owned
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    /// Theoretical output per second (`base_rate * units_owned`).
    pub fn instantaneous_rate(&self) -> f64 {
        self.base_rate * self.units_owned as f64
    }

    /// Measured output over the last full wall-clock second.
    pub fn production_per_second(&self) -> f64 {
        self.production_per_second
    }

    pub fn accumulated_time(&self) -> f64 {
        self.accumulated_time
    }

    pub fn max_step(&self) -> f64 {
        self.policy.max_step(self.units_owned)
    }

    /// Add the units bought by one purchase. The batch multiplier is captured
    /// here; later multiplier upgrades do not touch units already owned.
    pub fn add_units(&mut self, multiplier: u32) {
        self.units_owned += u64::from(multiplier.max(1));
    }

    /// Advance by `delta_ms`, crediting `resource`. Returns the amount credited.
    ///
    /// `now_ms` is host wall-clock time, used only for the once-per-second
    /// rate publication.
    pub fn update(&mut self, delta_ms: f64, now_ms: u64, resource: &mut Resource) -> f64 {
        if self.units_owned == 0 {
            self.production_per_second = 0.0;
            return 0.0;
        }
        debug_assert_eq!(resource.id(), self.target);

        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.accumulated_time += delta_ms / 1_000.0;
        }

        let rate = self.instantaneous_rate();
        let max_step = self.max_step();
        let per_step = rate * max_step;
        let mut credited = 0.0;
        while self.accumulated_time >= max_step {
            resource.add(per_step);
            credited += per_step;
            self.accumulated_time -= max_step;
        }
        self.production_counter += credited;

        let anchor = *self.rate_anchor_ms.get_or_insert(now_ms);
        let elapsed_ms = now_ms.saturating_sub(anchor);
        if elapsed_ms >= 1_000 {
            self.production_per_second = self.production_counter / (elapsed_ms as f64 / 1_000.0);
            self.production_counter = 0.0;
            self.rate_anchor_ms = Some(now_ms);
        }

        credited
    }

    /// Re-anchor the per-second measurement, e.g. after a pause in ticking.
    pub fn rearm(&mut self, now_ms: u64) {
        self.production_counter = 0.0;
        self.rate_anchor_ms = Some(now_ms);
    }

    /// Restore a saved unit count; pending time and rate measurement restart.
    pub fn restore(&mut self, units_owned: u64) {
        self.units_owned = units_owned;
        self.accumulated_time = 0.0;
        self.production_counter = 0.0;
        self.rate_anchor_ms = None;
        self.production_per_second = 0.0;
    }

    pub fn reset(&mut self) {
        self.restore(0);
    }
}
