//! Purchase cost progression.
//!
//! Cost advances by exactly one multiplier step per successful purchase
//! *event*. A batch of M units bought in one event costs M times the current
//! single-step price, not the sum of M successive geometric prices.

use super::resource::Resource;

/// Count and cost state of a repeatable (or one-shot) purchase.
#[derive(Clone, Debug)]
pub struct PurchaseLedger {
    base_cost: f64,
    cost_multiplier: f64,
    purchase_count: u32,
    /// Single-step price at the current count.
    current_cost: f64,
    repeatable: bool,
}

impl PurchaseLedger {
    pub fn new(base_cost: f64, cost_multiplier: f64) -> Self {
        Self {
            base_cost,
            cost_multiplier,
            purchase_count: 0,
            current_cost: base_cost,
            repeatable: true,
        }
    }

    /// A ledger that refuses every purchase after the first success.
    pub fn one_shot(base_cost: f64, cost_multiplier: f64) -> Self {
        Self {
            repeatable: false,
            ..Self::new(base_cost, cost_multiplier)
        }
    }

    pub fn base_cost(&self) -> f64 {
        self.base_cost
    }

    pub fn cost_multiplier(&self) -> f64 {
        self.cost_multiplier
    }

    pub fn purchase_count(&self) -> u32 {
        self.purchase_count
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    /// A one-shot ledger that has already been bought.
    pub fn is_exhausted(&self) -> bool {
        !self.repeatable && self.purchase_count > 0
    }

    /// Price of a purchase event acquiring `batch_size` units (minimum 1).
    pub fn current_cost(&self, batch_size: u32) -> f64 {
        (self.current_cost * f64::from(batch_size.max(1))).floor()
    }

    /// Whether `wallet` can pay for a `batch_size` purchase right now.
    pub fn is_affordable(&self, wallet: &Resource, batch_size: u32) -> bool {
        !self.is_exhausted() && wallet.can_afford(self.current_cost(batch_size))
    }

    /// Buy `batch_size` units if affordable.
    ///
    /// On success the cost is deducted from `wallet` and the count advances by
    /// one step whatever the batch size. Returns `false` (no state change)
    /// when funds are short or a one-shot ledger is already spent.
    pub fn purchase(&mut self, wallet: &mut Resource, batch_size: u32) -> bool {
        if self.is_exhausted() {
            return false;
        }
        let cost = self.current_cost(batch_size);
        if !wallet.can_afford(cost) {
            return false;
        }
        wallet.add(-cost);
        self.purchase_count += 1;
        self.current_cost = self.step_cost(self.purchase_count);
        true
    }

    /// Restore a saved count; the cost is recomputed, never trusted from disk.
    pub fn restore(&mut self, purchase_count: u32) {
        self.purchase_count = purchase_count;
        self.current_cost = self.step_cost(purchase_count);
    }

    pub fn reset(&mut self) {
        self.restore(0);
    }

    /// `floor(base * multiplier^count)`; the base cost itself is never floored.
    fn step_cost(&self, count: u32) -> f64 {
        if count == 0 {
            return self.base_cost;
        }
        let exponent = i32::try_from(count).unwrap_or(i32::MAX);
        (self.base_cost * self.cost_multiplier.powi(exponent)).floor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::resource::ResourceId;

    fn wallet(amount: f64) -> Resource {
        let mut r = Resource::new(ResourceId::Coins);
        r.set(amount);
        r
    }

    #[test]
    fn initial_cost_is_base() {
        let l = PurchaseLedger::new(15.0, 1.13);
        assert!((l.current_cost(1) - 15.0).abs() < f64::EPSILON);
        assert_eq!(l.purchase_count(), 0);
    }

    #[test]
    fn cost_after_one_purchase() {
        let mut l = PurchaseLedger::new(15.0, 1.13);
        let mut w = wallet(100.0);
        assert!(l.purchase(&mut w, 1));
        // floor(15 * 1.13) = floor(16.95) = 16
        assert!((l.current_cost(1) - 16.0).abs() < f64::EPSILON);
        assert!((w.get() - 85.0).abs() < 1e-9);
    }

    #[test]
    fn batch_costs_multiple_of_single_step_and_advances_once() {
        let mut l = PurchaseLedger::new(15.0, 1.13);
        let mut w = wallet(1_000.0);
        assert!(l.purchase(&mut w, 1));
        let single = l.current_cost(1);
        assert!((l.current_cost(3) - 3.0 * single).abs() < f64::EPSILON);

        let before = w.get();
        assert!(l.purchase(&mut w, 3));
        assert!((before - w.get() - 3.0 * single).abs() < 1e-9);
        assert_eq!(l.purchase_count(), 2);
    }

    #[test]
    fn zero_batch_treated_as_one() {
        let l = PurchaseLedger::new(10.0, 1.13);
        assert!((l.current_cost(0) - l.current_cost(1)).abs() < f64::EPSILON);
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        let mut l = PurchaseLedger::new(15.0, 1.13);
        let mut w = wallet(14.99);
        assert!(!l.purchase(&mut w, 1));
        assert_eq!(l.purchase_count(), 0);
        assert!((w.get() - 14.99).abs() < 1e-9);
        assert!((l.current_cost(1) - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exact_funds_succeed_and_leave_zero() {
        let mut l = PurchaseLedger::new(15.0, 1.13);
        let mut w = wallet(15.0);
        assert!(l.purchase(&mut w, 1));
        assert!((w.get() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn one_shot_refuses_second_purchase() {
        let mut l = PurchaseLedger::one_shot(100.0, 1.5);
        let mut w = wallet(1_000.0);
        assert!(l.purchase(&mut w, 1));
        assert!(l.is_exhausted());
        let after_first = w.get();
        assert!(!l.purchase(&mut w, 1));
        assert!((w.get() - after_first).abs() < f64::EPSILON);
        assert_eq!(l.purchase_count(), 1);
        assert!(!l.is_affordable(&w, 1));
    }

    #[test]
    fn restore_recomputes_cost() {
        let mut bought = PurchaseLedger::new(10.0, 1.13);
        let mut w = wallet(1e9);
        for _ in 0..7 {
            assert!(bought.purchase(&mut w, 1));
        }
        let mut restored = PurchaseLedger::new(10.0, 1.13);
        restored.restore(7);
        assert!((restored.current_cost(1) - bought.current_cost(1)).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_returns_to_base() {
        let mut l = PurchaseLedger::new(100.0, 1.2);
        l.restore(5);
        l.reset();
        assert_eq!(l.purchase_count(), 0);
        assert!((l.current_cost(1) - 100.0).abs() < f64::EPSILON);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::economy::resource::ResourceId;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_cost_matches_closed_form(count in 0u32..150) {
            let mut l = PurchaseLedger::new(15.0, 1.13);
            l.restore(count);
            let expected = if count == 0 { 15.0 } else { (15.0 * 1.13f64.powi(count as i32)).floor() };
            prop_assert!((l.current_cost(1) - expected).abs() < f64::EPSILON);
        }

        #[test]
        fn prop_cost_never_decreases(count in 0u32..150) {
            let mut l = PurchaseLedger::new(10.0, 1.15);
            l.restore(count);
            let a = l.current_cost(1);
            l.restore(count + 1);
            prop_assert!(l.current_cost(1) >= a);
        }

        #[test]
        fn prop_purchase_deducts_exact_batch_cost(
            batch in 1u32..20,
            extra in 0.0f64..1_000.0,
        ) {
            let mut l = PurchaseLedger::new(15.0, 1.13);
            let cost = l.current_cost(batch);
            let mut w = Resource::new(ResourceId::Coins);
            w.set(cost + extra);
            prop_assert!(l.purchase(&mut w, batch));
            prop_assert!((w.get() - extra).abs() < 1e-6);
            prop_assert_eq!(l.purchase_count(), 1);
        }

        #[test]
        fn prop_unaffordable_is_noop(batch in 1u32..20, short in 0.01f64..10.0) {
            let mut l = PurchaseLedger::new(15.0, 1.13);
            let cost = l.current_cost(batch);
            let mut w = Resource::new(ResourceId::Coins);
            w.set(cost - short);
            prop_assert!(!l.purchase(&mut w, batch));
            prop_assert_eq!(l.purchase_count(), 0);
            prop_assert!((w.get() - (cost - short)).abs() < 1e-9);
        }
    }
}
