//! Currency stocks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one of the game's currencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceId {
    Coins,
    Notes,
}

impl ResourceId {
    /// All currencies in display order.
    pub fn all() -> &'static [ResourceId] {
        &[ResourceId::Coins, ResourceId::Notes]
    }

    /// Stable identifier used in saves and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceId::Coins => "coins",
            ResourceId::Notes => "notes",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceId::Coins => "Coins",
            ResourceId::Notes => "Notes",
        }
    }

    /// Index into per-currency arrays.
    pub fn index(&self) -> usize {
        match self {
            ResourceId::Coins => 0,
            ResourceId::Notes => 1,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, never-negative stock of currency.
///
/// Writes never fail: negative and NaN inputs clamp to zero. Every write
/// raises a dirty flag that renderers consume with [`Resource::take_dirty`].
#[derive(Clone, Debug)]
pub struct Resource {
    id: ResourceId,
    amount: f64,
    /// Manual-click contribution pushed in by the economy each tick.
    additional_rate: f64,
    dirty: bool,
}

impl Resource {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            amount: 0.0,
            additional_rate: 0.0,
            dirty: true,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn display_name(&self) -> &'static str {
        self.id.display_name()
    }

    pub fn get(&self) -> f64 {
        self.amount
    }

    /// Set the amount, clamping to `max(0, value)`.
    pub fn set(&mut self, value: f64) {
        // `f64::max` ignores a NaN operand, so NaN lands on 0.0 as well.
        self.amount = value.max(0.0);
        self.dirty = true;
    }

    pub fn add(&mut self, amount: f64) {
        self.set(self.amount + amount);
    }

    pub fn can_afford(&self, cost: f64) -> bool {
        self.amount >= cost
    }

    /// Extra per-second rate shown next to generator output (manual clicks).
    pub fn additional_rate_per_second(&self) -> f64 {
        self.additional_rate
    }

    pub fn set_additional_rate(&mut self, rate: f64) {
        let rate = rate.max(0.0);
        if (rate - self.additional_rate).abs() > f64::EPSILON {
            self.additional_rate = rate;
            self.dirty = true;
        }
    }

    /// Return whether the resource changed since the last call, clearing the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Zero the stock for a new game.
    pub fn reset(&mut self) {
        self.set(0.0);
        self.additional_rate = 0.0;
    }
}
