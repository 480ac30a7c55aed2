//! Floating bonus timer and the bonuses currently on screen.

use rand::Rng;

use super::resource::ResourceId;

/// Spawn and payload tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct BonusSettings {
    /// Shortest interval between spawns, in whole seconds.
    pub min_seconds: u32,
    /// Longest interval between spawns, in whole seconds (inclusive).
    pub max_seconds: u32,
    /// Chance of a notes bonus once notes are unlocked.
    pub secondary_chance: f64,
    /// Inclusive coin amount range.
    pub coins_amount: (u32, u32),
    /// Inclusive notes amount range.
    pub notes_amount: (u32, u32),
    /// How long an uncollected bonus stays collectable.
    pub ttl_ms: f64,
}

impl Default for BonusSettings {
    fn default() -> Self {
        Self {
            min_seconds: 80,
            max_seconds: 320,
            secondary_chance: 0.2,
            coins_amount: (3_000, 6_000),
            notes_amount: (1, 3),
            ttl_ms: 30_000.0,
        }
    }
}

/// What a bonus pays when collected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BonusPayload {
    pub currency: ResourceId,
    pub amount: u32,
}

/// Countdown to the next floating bonus.
#[derive(Clone, Debug)]
pub struct BonusSpawner {
    remaining_ms: f64,
    settings: BonusSettings,
}

impl BonusSpawner {
    pub fn new<R: Rng + ?Sized>(settings: BonusSettings, rng: &mut R) -> Self {
        let mut spawner = Self {
            remaining_ms: 0.0,
            settings,
        };
        spawner.redraw(rng);
        spawner
    }

    pub fn settings(&self) -> &BonusSettings {
        &self.settings
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    pub fn set_remaining_ms(&mut self, remaining_ms: f64) {
        self.remaining_ms = remaining_ms.max(0.0);
    }

    /// Draw a fresh countdown, uniform over whole seconds in the bounds.
    pub fn redraw<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let lo = self.settings.min_seconds.min(self.settings.max_seconds);
        let hi = self.settings.max_seconds.max(lo);
        let seconds = rng.gen_range(lo..=hi);
        self.remaining_ms = f64::from(seconds) * 1_000.0;
    }

    /// Count down while `eligible`. Returns `true` when a bonus should spawn;
    /// the countdown has already been redrawn by then.
    pub fn tick<R: Rng + ?Sized>(&mut self, delta_ms: f64, eligible: bool, rng: &mut R) -> bool {
        if !eligible || !delta_ms.is_finite() || delta_ms <= 0.0 {
            return false;
        }
        self.remaining_ms -= delta_ms;
        if self.remaining_ms <= 0.0 {
            self.redraw(rng);
            true
        } else {
            false
        }
    }

    /// Pick the currency and size of a new bonus.
    pub fn roll_payload<R: Rng + ?Sized>(&self, secondary_unlocked: bool, rng: &mut R) -> BonusPayload {
        let chance = self.settings.secondary_chance.clamp(0.0, 1.0);
        let notes = secondary_unlocked && rng.gen_bool(chance);
        let (currency, (lo, hi)) = if notes {
            (ResourceId::Notes, self.settings.notes_amount)
        } else {
            (ResourceId::Coins, self.settings.coins_amount)
        };
        let amount = rng.gen_range(lo.min(hi)..=hi.max(lo));
        BonusPayload { currency, amount }
    }
}

/// A spawned bonus waiting to be collected.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatingBonus {
    pub id: u64,
    pub payload: BonusPayload,
    pub remaining_ttl_ms: f64,
}

/// Bonuses currently on screen.
#[derive(Clone, Debug, Default)]
pub struct BonusBoard {
    live: Vec<FloatingBonus>,
    next_id: u64,
}

impl BonusBoard {
    pub fn live(&self) -> &[FloatingBonus] {
        &self.live
    }

    pub fn spawn(&mut self, payload: BonusPayload, ttl_ms: f64) -> FloatingBonus {
        self.next_id += 1;
        let bonus = FloatingBonus {
            id: self.next_id,
            payload,
            remaining_ttl_ms: ttl_ms,
        };
        self.live.push(bonus.clone());
        bonus
    }

    /// Age every bonus by `delta_ms`; expired ones are removed and returned.
    pub fn advance(&mut self, delta_ms: f64) -> Vec<FloatingBonus> {
        if !delta_ms.is_finite() || delta_ms <= 0.0 {
            return Vec::new();
        }
        for bonus in &mut self.live {
            bonus.remaining_ttl_ms -= delta_ms;
        }
        let (expired, live): (Vec<_>, Vec<_>) = self
            .live
            .drain(..)
            .partition(|b| b.remaining_ttl_ms <= 0.0);
        self.live = live;
        expired
    }

    /// Remove a bonus for collection. `None` if it expired or never existed.
    pub fn take(&mut self, id: u64) -> Option<FloatingBonus> {
        let idx = self.live.iter().position(|b| b.id == id)?;
        Some(self.live.remove(idx))
    }

    /// The oldest live bonus, for hosts with a single "collect" key.
    pub fn oldest(&self) -> Option<&FloatingBonus> {
        self.live.first()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn initial_countdown_within_bounds() {
        let mut r = rng();
        for _ in 0..100 {
            let s = BonusSpawner::new(BonusSettings::default(), &mut r);
            assert!(s.remaining_ms() >= 80_000.0 && s.remaining_ms() <= 320_000.0);
        }
    }

    #[test]
    fn spawns_once_when_countdown_crosses_zero() {
        let mut r = rng();
        let mut s = BonusSpawner::new(BonusSettings::default(), &mut r);
        s.set_remaining_ms(50.0);
        assert!(s.tick(100.0, true, &mut r));
        assert!(s.remaining_ms() >= 80_000.0 && s.remaining_ms() <= 320_000.0);
        assert!(!s.tick(100.0, true, &mut r));
    }

    #[test]
    fn ineligible_state_freezes_countdown() {
        let mut r = rng();
        let mut s = BonusSpawner::new(BonusSettings::default(), &mut r);
        s.set_remaining_ms(50.0);
        assert!(!s.tick(100.0, false, &mut r));
        assert!((s.remaining_ms() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn countdown_decreases_by_delta() {
        let mut r = rng();
        let mut s = BonusSpawner::new(BonusSettings::default(), &mut r);
        s.set_remaining_ms(1_000.0);
        assert!(!s.tick(400.0, true, &mut r));
        assert!((s.remaining_ms() - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn payload_is_coins_until_secondary_unlocked() {
        let mut r = rng();
        let s = BonusSpawner::new(BonusSettings::default(), &mut r);
        for _ in 0..200 {
            let p = s.roll_payload(false, &mut r);
            assert_eq!(p.currency, ResourceId::Coins);
            assert!((3_000..=6_000).contains(&p.amount));
        }
    }

    #[test]
    fn payload_mix_once_unlocked() {
        let mut r = rng();
        let s = BonusSpawner::new(BonusSettings::default(), &mut r);
        let mut notes = 0;
        for _ in 0..2_000 {
            let p = s.roll_payload(true, &mut r);
            match p.currency {
                ResourceId::Notes => {
                    notes += 1;
                    assert!((1..=3).contains(&p.amount));
                }
                ResourceId::Coins => assert!((3_000..=6_000).contains(&p.amount)),
            }
        }
        // 20% expected; wide margin for a seeded sample
        assert!(notes > 250 && notes < 550, "notes bonuses: {}", notes);
    }

    #[test]
    fn board_expires_after_ttl() {
        let mut board = BonusBoard::default();
        let payload = BonusPayload {
            currency: ResourceId::Coins,
            amount: 3_000,
        };
        let b = board.spawn(payload, 30_000.0);
        assert!(board.advance(29_999.0).is_empty());
        let expired = board.advance(1.0);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, b.id);
        assert!(board.take(b.id).is_none());
    }

    #[test]
    fn board_take_removes_once() {
        let mut board = BonusBoard::default();
        let payload = BonusPayload {
            currency: ResourceId::Notes,
            amount: 2,
        };
        let a = board.spawn(payload, 30_000.0);
        let b = board.spawn(payload, 30_000.0);
        assert_ne!(a.id, b.id);
        assert_eq!(board.oldest().map(|x| x.id), Some(a.id));
        assert!(board.take(a.id).is_some());
        assert!(board.take(a.id).is_none());
        assert_eq!(board.live().len(), 1);
    }
}
