//! The economic simulation: currencies, generators, upgrades, clicks, bonuses.
//!
//! [`GameEconomy`] owns every component and is the only thing the host shell
//! talks to. It never touches the DOM; renderers read getters and drain
//! [`EconomyEvent`]s.

pub mod bonus;
pub mod clicks;
pub mod generator;
pub mod ledger;
pub mod resource;
pub mod upgrades;

mod simulator;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::EconomyConfig;
use bonus::{BonusBoard, BonusPayload, BonusSpawner, FloatingBonus};
use clicks::{ManualClickTracker, ThresholdClicker};
use generator::AutoGenerator;
use ledger::PurchaseLedger;
use resource::{Resource, ResourceId};
use upgrades::{create_upgrades, Effect, Unlock, Upgrade, UpgradeId};

/// Which screen the player is on. Only Main and Upgrades advance time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Main,
    Upgrades,
}

impl Screen {
    pub fn is_active(&self) -> bool {
        !matches!(self, Screen::Menu)
    }
}

/// Something renderers may want to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum EconomyEvent {
    Purchased {
        upgrade: UpgradeId,
        currency: ResourceId,
        cost: f64,
    },
    ClickAwarded {
        currency: ResourceId,
        amount: f64,
    },
    BonusSpawned(FloatingBonus),
    BonusCollected {
        id: u64,
        payload: BonusPayload,
    },
    BonusExpired {
        id: u64,
    },
    UpgradeRevealed(UpgradeId),
    AffordabilityChanged {
        upgrade: UpgradeId,
        affordable: bool,
    },
    ScreenChanged(Screen),
}

/// Everything the economy tracks for one currency.
#[derive(Clone, Debug)]
pub struct Currency {
    pub(crate) resource: Resource,
    pub(crate) generator: AutoGenerator,
    pub(crate) tracker: ManualClickTracker,
    pub(crate) clicker: ThresholdClicker,
    /// Amount awarded per threshold click.
    pub(crate) increment_value: f64,
    /// Added to `increment_value` by each click-value upgrade.
    pub(crate) manual_multiplier_rate: u32,
    /// Units gained per generator purchase.
    pub(crate) auto_multiplier_rate: u32,
}

impl Currency {
    fn new(id: ResourceId, config: &EconomyConfig) -> Self {
        Self {
            resource: Resource::new(id),
            generator: AutoGenerator::new(
                id,
                config.generator.base_rate,
                config.generator.step_policy(),
            ),
            tracker: ManualClickTracker::new(config.clicks.retention_ms),
            clicker: ThresholdClicker::new(config.clicks.threshold),
            increment_value: 1.0,
            manual_multiplier_rate: 1,
            auto_multiplier_rate: 1,
        }
    }

    fn reset(&mut self) {
        self.resource.reset();
        self.generator.reset();
        self.tracker.clear();
        self.clicker.reset();
        self.increment_value = 1.0;
        self.manual_multiplier_rate = 1;
        self.auto_multiplier_rate = 1;
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn generator(&self) -> &AutoGenerator {
        &self.generator
    }

    pub fn clicker(&self) -> &ThresholdClicker {
        &self.clicker
    }

    pub fn increment_value(&self) -> f64 {
        self.increment_value
    }

    pub fn manual_multiplier_rate(&self) -> u32 {
        self.manual_multiplier_rate
    }

    pub fn auto_multiplier_rate(&self) -> u32 {
        self.auto_multiplier_rate
    }

    /// Average value of one click under the threshold award.
    fn per_click_value(&self) -> f64 {
        self.increment_value / f64::from(self.clicker.threshold())
    }
}

/// The whole game economy.
pub struct GameEconomy {
    config: EconomyConfig,
    pub(crate) currencies: [Currency; 2],
    pub(crate) upgrades: Vec<Upgrade>,
    spawner: BonusSpawner,
    bonuses: BonusBoard,
    rng: SmallRng,
    screen: Screen,
    last_active: Screen,
    /// Whether the previous tick advanced generators.
    ticking: bool,
    /// A game was started or restored, so the menu can resume it.
    pub(crate) started: bool,
    pub(crate) notes_printable: bool,
    pub(crate) note_tech_revealed: bool,
    events: Vec<EconomyEvent>,
}

impl GameEconomy {
    pub fn new(config: EconomyConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let spawner = BonusSpawner::new(config.bonus.settings(), &mut rng);
        let currencies = [
            Currency::new(ResourceId::Coins, &config),
            Currency::new(ResourceId::Notes, &config),
        ];
        Self {
            currencies,
            upgrades: create_upgrades(),
            spawner,
            bonuses: BonusBoard::default(),
            rng,
            screen: Screen::Menu,
            last_active: Screen::Main,
            ticking: false,
            started: false,
            notes_printable: false,
            note_tech_revealed: false,
            events: Vec::new(),
            config,
        }
    }

    // ── Getters ──────────────────────────────────────────────────

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn currency(&self, id: ResourceId) -> &Currency {
        &self.currencies[id.index()]
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.currencies[id.index()].resource
    }

    /// Direct write access for tooling and tests.
    pub fn resource_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.currencies[id.index()].resource
    }

    pub fn generator(&self, id: ResourceId) -> &AutoGenerator {
        &self.currencies[id.index()].generator
    }

    pub fn upgrade(&self, id: UpgradeId) -> &Upgrade {
        &self.upgrades[upgrade_index(id)]
    }

    pub fn ledger(&self, id: UpgradeId) -> &PurchaseLedger {
        &self.upgrade(id).ledger
    }

    pub fn spawner(&self) -> &BonusSpawner {
        &self.spawner
    }

    pub fn live_bonuses(&self) -> &[FloatingBonus] {
        self.bonuses.live()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn notes_printable(&self) -> bool {
        self.notes_printable
    }

    pub fn note_tech_revealed(&self) -> bool {
        self.note_tech_revealed
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Bonus payloads may be notes once anything has been bought.
    pub fn secondary_unlocked(&self) -> bool {
        self.upgrades.iter().any(|u| u.ledger.purchase_count() > 0)
    }

    pub fn is_unlocked(&self, id: UpgradeId) -> bool {
        match id.unlock() {
            Unlock::Always => true,
            Unlock::NoteTechRevealed => self.note_tech_revealed,
            Unlock::NotesPrintable => self.notes_printable,
        }
    }

    /// Upgrades the player can currently see, in display order.
    pub fn visible_upgrades(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.iter().filter(|u| self.is_unlocked(u.id))
    }

    /// Units a purchase of `id` acquires; the cost scales with it.
    pub fn batch_size(&self, id: UpgradeId) -> u32 {
        match id.effect() {
            Effect::GeneratorUnits(c) => self.currencies[c.index()].auto_multiplier_rate,
            _ => 1,
        }
    }

    /// Price of the next purchase of `id`.
    pub fn cost_of(&self, id: UpgradeId) -> f64 {
        self.ledger(id).current_cost(self.batch_size(id))
    }

    pub fn drain_events(&mut self) -> Vec<EconomyEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Screens ──────────────────────────────────────────────────

    fn set_screen(&mut self, screen: Screen) {
        if screen.is_active() {
            self.last_active = screen;
        }
        if self.screen != screen {
            self.screen = screen;
            self.events.push(EconomyEvent::ScreenChanged(screen));
        }
    }

    pub fn enter_menu(&mut self) {
        self.set_screen(Screen::Menu);
    }

    /// Leave the menu for the screen the player was last on. Does nothing
    /// before a game has been started or restored.
    pub fn resume(&mut self) -> bool {
        if !self.started {
            return false;
        }
        self.set_screen(self.last_active);
        true
    }

    pub fn show_upgrades(&mut self) {
        self.set_screen(Screen::Upgrades);
    }

    pub fn show_main(&mut self) {
        self.set_screen(Screen::Main);
    }

    // ── Simulation ───────────────────────────────────────────────

    /// Advance the simulation by one host frame.
    pub fn tick(&mut self, delta_ms: f64, now_ms: u64) {
        let active = self.screen.is_active();

        if active {
            if !self.ticking {
                // this frame's delta is the first time counted after the pause
                let since = now_ms.saturating_sub(delta_ms.max(0.0) as u64);
                for c in &mut self.currencies {
                    c.generator.rearm(since);
                }
            }
            for expired in self.bonuses.advance(delta_ms) {
                tracing::debug!(id = expired.id, "bonus expired");
                self.events.push(EconomyEvent::BonusExpired { id: expired.id });
            }
            for c in &mut self.currencies {
                c.generator.update(delta_ms, now_ms, &mut c.resource);
            }
        }
        self.ticking = active;

        for c in &mut self.currencies {
            let per_click = c.per_click_value();
            let rate = c.tracker.current_rate_per_second(now_ms, per_click);
            c.resource.set_additional_rate(rate);
        }

        if self.spawner.tick(delta_ms, active, &mut self.rng) {
            let secondary = self.secondary_unlocked();
            let payload = self.spawner.roll_payload(secondary, &mut self.rng);
            let bonus = self.bonuses.spawn(payload, self.spawner.settings().ttl_ms);
            tracing::debug!(
                id = bonus.id,
                currency = %payload.currency,
                amount = payload.amount,
                "bonus spawned"
            );
            self.events.push(EconomyEvent::BonusSpawned(bonus));
        }

        self.refresh_affordability();
    }

    /// Re-evaluate every upgrade's affordability, emitting changes.
    pub fn refresh_affordability(&mut self) {
        for i in 0..self.upgrades.len() {
            let id = self.upgrades[i].id;
            let wallet = &self.currencies[id.pays_in().index()].resource;
            let affordable =
                self.is_unlocked(id) && self.upgrades[i].ledger.is_affordable(wallet, self.batch_size(id));
            if affordable != self.upgrades[i].affordable {
                self.upgrades[i].affordable = affordable;
                self.events.push(EconomyEvent::AffordabilityChanged {
                    upgrade: id,
                    affordable,
                });
            }
        }
    }

    /// Buy one step of `id`. Returns `false` when locked or unaffordable.
    pub fn purchase(&mut self, id: UpgradeId) -> bool {
        if !self.is_unlocked(id) {
            tracing::debug!(upgrade = id.as_str(), "purchase refused: locked");
            return false;
        }
        let batch = self.batch_size(id);
        let currency = id.pays_in();
        let cost = self.upgrades[upgrade_index(id)].ledger.current_cost(batch);
        let wallet = &mut self.currencies[currency.index()].resource;
        if !self.upgrades[upgrade_index(id)].ledger.purchase(wallet, batch) {
            tracing::debug!(upgrade = id.as_str(), cost, "purchase refused: insufficient funds");
            return false;
        }

        self.apply_effect(id.effect(), batch);
        tracing::info!(upgrade = id.as_str(), %currency, cost, "purchased");
        self.events.push(EconomyEvent::Purchased {
            upgrade: id,
            currency,
            cost,
        });
        self.refresh_affordability();
        true
    }

    fn apply_effect(&mut self, effect: Effect, batch: u32) {
        match effect {
            Effect::ClickValue(c) => {
                let cur = &mut self.currencies[c.index()];
                cur.increment_value += f64::from(cur.manual_multiplier_rate);
            }
            Effect::ManualMultiplier(c) => {
                self.currencies[c.index()].manual_multiplier_rate += 1;
            }
            Effect::GeneratorUnits(c) => {
                self.currencies[c.index()].generator.add_units(batch);
            }
            Effect::AutoMultiplier(c) => {
                self.currencies[c.index()].auto_multiplier_rate += 1;
            }
            Effect::UnlockNotes => {
                self.notes_printable = true;
                for id in UpgradeId::all() {
                    if id.unlock() == Unlock::NotesPrintable {
                        self.events.push(EconomyEvent::UpgradeRevealed(*id));
                    }
                }
            }
        }
    }

    /// Register one manual click on `currency`. Returns the amount awarded,
    /// if this click completed the threshold.
    pub fn click(&mut self, currency: ResourceId, now_ms: u64) -> Option<f64> {
        if currency == ResourceId::Notes && !self.notes_printable {
            tracing::debug!("note click ignored: notes not printable yet");
            return None;
        }
        let c = &mut self.currencies[currency.index()];
        c.tracker.record_click(now_ms);
        if !c.clicker.click() {
            return None;
        }
        let amount = c.increment_value;
        c.resource.add(amount);
        self.events.push(EconomyEvent::ClickAwarded { currency, amount });
        Some(amount)
    }

    /// Collect a live bonus. `None` if it expired or never existed.
    pub fn collect_bonus(&mut self, id: u64) -> Option<BonusPayload> {
        let bonus = self.bonuses.take(id)?;
        let payload = bonus.payload;
        self.currencies[payload.currency.index()]
            .resource
            .add(f64::from(payload.amount));
        tracing::info!(id, currency = %payload.currency, amount = payload.amount, "bonus collected");
        self.events.push(EconomyEvent::BonusCollected { id, payload });

        if payload.currency == ResourceId::Notes && !self.note_tech_revealed {
            self.note_tech_revealed = true;
            self.events
                .push(EconomyEvent::UpgradeRevealed(UpgradeId::NotePrintingTech));
        }
        Some(payload)
    }

    /// Collect the oldest live bonus, if any.
    pub fn collect_oldest_bonus(&mut self) -> Option<BonusPayload> {
        let id = self.bonuses.oldest()?.id;
        self.collect_bonus(id)
    }

    /// Wipe all progress and start playing on the main screen.
    pub fn new_game(&mut self, now_ms: u64) {
        for c in &mut self.currencies {
            c.reset();
            c.generator.rearm(now_ms);
        }
        for u in &mut self.upgrades {
            u.ledger.reset();
            u.affordable = false;
        }
        self.bonuses.clear();
        self.spawner.redraw(&mut self.rng);
        self.notes_printable = false;
        self.note_tech_revealed = false;
        self.ticking = true;
        self.started = true;
        self.last_active = Screen::Main;
        self.set_screen(Screen::Main);
        tracing::info!("new game started");
        self.refresh_affordability();
    }

    /// Timer access for tests and the balance simulator.
    #[cfg(test)]
    pub(crate) fn spawner_mut(&mut self) -> &mut BonusSpawner {
        &mut self.spawner
    }
}

fn upgrade_index(id: UpgradeId) -> usize {
    UpgradeId::all()
        .iter()
        .position(|u| *u == id)
        .unwrap_or_default()
}
