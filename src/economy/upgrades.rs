//! Upgrade catalog: what can be bought, what it costs and what it does.

use super::ledger::PurchaseLedger;
use super::resource::ResourceId;

/// Every purchasable upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UpgradeId {
    BetterClicks,
    BetterClicksMultiplier,
    AutoClicker,
    AutoClickerMultiplier,
    NotePrintingTech,
    BetterNoteClicks,
    BetterNoteClicksMultiplier,
    NoteAutoClicker,
    NoteAutoClickerMultiplier,
}

impl UpgradeId {
    /// All upgrades in display order.
    pub fn all() -> &'static [UpgradeId] {
        &[
            UpgradeId::BetterClicks,
            UpgradeId::BetterClicksMultiplier,
            UpgradeId::AutoClicker,
            UpgradeId::AutoClickerMultiplier,
            UpgradeId::NotePrintingTech,
            UpgradeId::BetterNoteClicks,
            UpgradeId::BetterNoteClicksMultiplier,
            UpgradeId::NoteAutoClicker,
            UpgradeId::NoteAutoClickerMultiplier,
        ]
    }

    /// Stable id used as the save-record key.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeId::BetterClicks => "betterClicks",
            UpgradeId::BetterClicksMultiplier => "betterClicksMultiplier",
            UpgradeId::AutoClicker => "autoClicker",
            UpgradeId::AutoClickerMultiplier => "autoClickerMultiplier",
            UpgradeId::NotePrintingTech => "notePrintingTech",
            UpgradeId::BetterNoteClicks => "betterNoteClicks",
            UpgradeId::BetterNoteClicksMultiplier => "betterNoteClicksMultiplier",
            UpgradeId::NoteAutoClicker => "noteAutoClicker",
            UpgradeId::NoteAutoClickerMultiplier => "noteAutoClickerMultiplier",
        }
    }

    pub fn parse(s: &str) -> Option<UpgradeId> {
        UpgradeId::all().iter().copied().find(|id| id.as_str() == s)
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            UpgradeId::BetterClicks => "Better Clicks",
            UpgradeId::BetterClicksMultiplier => "Click Multiplier",
            UpgradeId::AutoClicker => "Coin Minter",
            UpgradeId::AutoClickerMultiplier => "Minter Batch Size",
            UpgradeId::NotePrintingTech => "Note Printing Tech",
            UpgradeId::BetterNoteClicks => "Better Note Clicks",
            UpgradeId::BetterNoteClicksMultiplier => "Note Click Multiplier",
            UpgradeId::NoteAutoClicker => "Note Press",
            UpgradeId::NoteAutoClickerMultiplier => "Press Batch Size",
        }
    }

    /// Key to buy on the upgrades screen (1-9 in display order).
    pub fn key(&self) -> char {
        match self {
            UpgradeId::BetterClicks => '1',
            UpgradeId::BetterClicksMultiplier => '2',
            UpgradeId::AutoClicker => '3',
            UpgradeId::AutoClickerMultiplier => '4',
            UpgradeId::NotePrintingTech => '5',
            UpgradeId::BetterNoteClicks => '6',
            UpgradeId::BetterNoteClicksMultiplier => '7',
            UpgradeId::NoteAutoClicker => '8',
            UpgradeId::NoteAutoClickerMultiplier => '9',
        }
    }

    pub fn from_key(key: char) -> Option<UpgradeId> {
        UpgradeId::all().iter().copied().find(|id| id.key() == key)
    }

    /// Currency the upgrade is paid in.
    pub fn pays_in(&self) -> ResourceId {
        match self {
            UpgradeId::BetterNoteClicks
            | UpgradeId::BetterNoteClicksMultiplier
            | UpgradeId::NoteAutoClicker => ResourceId::Notes,
            _ => ResourceId::Coins,
        }
    }

    pub fn base_cost(&self) -> f64 {
        match self {
            UpgradeId::BetterClicks => 10.0,
            UpgradeId::BetterClicksMultiplier => 150.0,
            UpgradeId::AutoClicker => 15.0,
            UpgradeId::AutoClickerMultiplier => 100.0,
            UpgradeId::NotePrintingTech => 10_000.0,
            UpgradeId::BetterNoteClicks => 5.0,
            UpgradeId::BetterNoteClicksMultiplier => 25.0,
            UpgradeId::NoteAutoClicker => 15.0,
            UpgradeId::NoteAutoClickerMultiplier => 150.0,
        }
    }

    pub fn cost_multiplier(&self) -> f64 {
        match self {
            UpgradeId::BetterClicks
            | UpgradeId::AutoClicker
            | UpgradeId::BetterNoteClicks
            | UpgradeId::NoteAutoClicker => 1.13,
            UpgradeId::BetterClicksMultiplier | UpgradeId::BetterNoteClicksMultiplier => 1.15,
            UpgradeId::AutoClickerMultiplier | UpgradeId::NoteAutoClickerMultiplier => 1.2,
            UpgradeId::NotePrintingTech => 1.5,
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            UpgradeId::BetterClicks => Effect::ClickValue(ResourceId::Coins),
            UpgradeId::BetterClicksMultiplier => Effect::ManualMultiplier(ResourceId::Coins),
            UpgradeId::AutoClicker => Effect::GeneratorUnits(ResourceId::Coins),
            UpgradeId::AutoClickerMultiplier => Effect::AutoMultiplier(ResourceId::Coins),
            UpgradeId::NotePrintingTech => Effect::UnlockNotes,
            UpgradeId::BetterNoteClicks => Effect::ClickValue(ResourceId::Notes),
            UpgradeId::BetterNoteClicksMultiplier => Effect::ManualMultiplier(ResourceId::Notes),
            UpgradeId::NoteAutoClicker => Effect::GeneratorUnits(ResourceId::Notes),
            UpgradeId::NoteAutoClickerMultiplier => Effect::AutoMultiplier(ResourceId::Notes),
        }
    }

    pub fn unlock(&self) -> Unlock {
        match self {
            UpgradeId::BetterClicks
            | UpgradeId::BetterClicksMultiplier
            | UpgradeId::AutoClicker
            | UpgradeId::AutoClickerMultiplier => Unlock::Always,
            UpgradeId::NotePrintingTech => Unlock::NoteTechRevealed,
            _ => Unlock::NotesPrintable,
        }
    }

    pub fn is_repeatable(&self) -> bool {
        !matches!(self, UpgradeId::NotePrintingTech)
    }

    /// One-line description for the upgrades screen.
    pub fn description(&self) -> &'static str {
        match self.effect() {
            Effect::ClickValue(_) => "+click value",
            Effect::ManualMultiplier(_) => "+1 to click upgrade strength",
            Effect::GeneratorUnits(_) => "+units producing 1/s each",
            Effect::AutoMultiplier(_) => "+1 unit per purchase",
            Effect::UnlockNotes => "Start printing notes",
        }
    }
}

/// What a successful purchase does to the economy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Click value of the currency grows by its manual multiplier rate.
    ClickValue(ResourceId),
    /// Manual multiplier rate of the currency grows by one.
    ManualMultiplier(ResourceId),
    /// The currency's generator gains auto-multiplier-rate units.
    GeneratorUnits(ResourceId),
    /// Auto multiplier rate of the currency grows by one.
    AutoMultiplier(ResourceId),
    /// Notes become printable.
    UnlockNotes,
}

/// Condition under which an upgrade is visible and purchasable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unlock {
    Always,
    /// After the first collected notes bonus.
    NoteTechRevealed,
    /// After Note Printing Tech is bought.
    NotesPrintable,
}

/// One catalog entry with its purchase state.
#[derive(Clone, Debug)]
pub struct Upgrade {
    pub id: UpgradeId,
    pub ledger: PurchaseLedger,
    /// Last published affordability, used to emit change events.
    pub affordable: bool,
}

impl Upgrade {
    pub fn new(id: UpgradeId) -> Self {
        let ledger = if id.is_repeatable() {
            PurchaseLedger::new(id.base_cost(), id.cost_multiplier())
        } else {
            PurchaseLedger::one_shot(id.base_cost(), id.cost_multiplier())
        };
        Self {
            id,
            ledger,
            affordable: false,
        }
    }
}

/// Build the catalog, indexed in `UpgradeId::all()` order.
pub fn create_upgrades() -> Vec<Upgrade> {
    UpgradeId::all().iter().map(|&id| Upgrade::new(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_roundtrip_through_strings() {
        for id in UpgradeId::all() {
            assert_eq!(UpgradeId::parse(id.as_str()), Some(*id));
        }
        assert_eq!(UpgradeId::parse("goldenCookie"), None);
    }

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<char> = UpgradeId::all().iter().map(|id| id.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), UpgradeId::all().len());
        assert_eq!(UpgradeId::from_key('3'), Some(UpgradeId::AutoClicker));
        assert_eq!(UpgradeId::from_key('0'), None);
    }

    #[test]
    fn catalog_matches_all_order() {
        let upgrades = create_upgrades();
        assert_eq!(upgrades.len(), UpgradeId::all().len());
        for (u, id) in upgrades.iter().zip(UpgradeId::all()) {
            assert_eq!(u.id, *id);
            assert!((u.ledger.current_cost(1) - id.base_cost()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn note_tech_is_one_shot() {
        let upgrades = create_upgrades();
        let tech = upgrades
            .iter()
            .find(|u| u.id == UpgradeId::NotePrintingTech)
            .map(|u| u.ledger.is_repeatable());
        assert_eq!(tech, Some(false));
    }

    #[test]
    fn note_generator_multiplier_is_paid_in_coins() {
        assert_eq!(UpgradeId::NoteAutoClickerMultiplier.pays_in(), ResourceId::Coins);
        assert_eq!(UpgradeId::NoteAutoClicker.pays_in(), ResourceId::Notes);
    }

    #[test]
    fn base_upgrades_always_unlocked() {
        assert_eq!(UpgradeId::BetterClicks.unlock(), Unlock::Always);
        assert_eq!(UpgradeId::NotePrintingTech.unlock(), Unlock::NoteTechRevealed);
        assert_eq!(UpgradeId::BetterNoteClicks.unlock(), Unlock::NotesPrintable);
    }
}
