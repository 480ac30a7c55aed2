//! Host shell state: the economy plus everything around it that is not
//! simulation (frame clock, persistence, key dispatch, message log).
//!
//! `main.rs` owns one `App` behind `Rc<RefCell<_>>` and calls [`App::frame`]
//! from the draw loop and [`App::handle_key`] from input handlers.

use std::collections::VecDeque;

use crate::config::EconomyConfig;
use crate::economy::resource::ResourceId;
use crate::economy::upgrades::UpgradeId;
use crate::economy::{EconomyEvent, GameEconomy, Screen};
use crate::error::PersistError;
use crate::format::format_number;
use crate::save::{self, AutosaveTimer, SaveStore};
use crate::time::FrameClock;

/// Lines kept in the message log.
pub const LOG_CAPACITY: usize = 50;

/// One line of the message log.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

pub struct App {
    pub economy: GameEconomy,
    clock: FrameClock,
    store: Box<dyn SaveStore>,
    autosave: AutosaveTimer,
    log: VecDeque<LogEntry>,
    /// Formatted stock per currency, refreshed when the resource reports a change.
    amount_labels: [String; 2],
}

impl App {
    /// Build the app and load any existing save from `store`.
    pub fn new(config: EconomyConfig, store: Box<dyn SaveStore>, seed: u64) -> Self {
        let autosave = AutosaveTimer::new(config.persistence.autosave_interval_ms);
        let mut app = Self {
            economy: GameEconomy::new(config, seed),
            clock: FrameClock::new(),
            store,
            autosave,
            log: VecDeque::new(),
            amount_labels: [String::new(), String::new()],
        };
        if let Err(e) = save::load_from(app.store.as_ref(), &mut app.economy) {
            app.notice(format!("Could not load save: {e}"));
        }
        app.economy.drain_events();
        app.refresh_labels();
        app
    }

    pub fn log(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter()
    }

    /// A game is loaded or in progress. Independent of whether saving works.
    pub fn can_resume(&self) -> bool {
        self.economy.has_started()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Display text for a currency's stock as of the last processed input or frame.
    pub fn amount_label(&self, id: ResourceId) -> &str {
        &self.amount_labels[id.index()]
    }

    fn refresh_labels(&mut self) {
        for id in ResourceId::all() {
            let resource = self.economy.resource_mut(*id);
            if resource.take_dirty() {
                self.amount_labels[id.index()] = format_number(resource.get());
            }
        }
    }

    fn push_log(&mut self, text: String, is_important: bool) {
        if self.log.len() >= LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(LogEntry { text, is_important });
    }

    /// Surface a collaborator failure to the player and the console.
    fn notice(&mut self, text: String) {
        tracing::warn!("{text}");
        self.push_log(text, true);
    }

    /// Advance one rendered frame at host time `now_ms`.
    pub fn frame(&mut self, now_ms: f64) {
        let delta = self.clock.update(now_ms);
        let now = self.clock.now_ms();
        self.economy.tick(delta, now);
        if self.economy.screen().is_active() && self.autosave.tick(delta) {
            self.save_now();
        }
        self.process_events();
    }

    fn process_events(&mut self) {
        for event in self.economy.drain_events() {
            match event {
                EconomyEvent::Purchased {
                    upgrade,
                    currency,
                    cost,
                } => self.push_log(
                    format!(
                        "Bought {} for {} {}",
                        upgrade.name(),
                        format_number(cost),
                        currency.display_name()
                    ),
                    false,
                ),
                EconomyEvent::BonusSpawned(_) => {
                    self.push_log("A bonus is floating by! [B] to grab it".to_string(), true)
                }
                EconomyEvent::BonusCollected { payload, .. } => self.push_log(
                    format!(
                        "Bonus: +{} {}",
                        format_number(f64::from(payload.amount)),
                        payload.currency.display_name()
                    ),
                    true,
                ),
                EconomyEvent::BonusExpired { .. } => {
                    self.push_log("The bonus drifted away".to_string(), false)
                }
                EconomyEvent::UpgradeRevealed(id) => {
                    self.push_log(format!("New upgrade available: {}", id.name()), true)
                }
                EconomyEvent::ClickAwarded { .. }
                | EconomyEvent::AffordabilityChanged { .. }
                | EconomyEvent::ScreenChanged(_) => {}
            }
        }
        self.refresh_labels();
    }

    /// Persist now, reporting failure as a notice.
    pub fn save_now(&mut self) {
        match save::save_to(self.store.as_mut(), &self.economy) {
            Ok(()) => self.autosave.reset(),
            Err(e) => self.notice(format!("Save failed: {e}")),
        }
    }

    /// Current state as a copy/paste string.
    pub fn export_save(&mut self) -> Option<String> {
        match save::export_save_string(&self.economy.capture_state()) {
            Ok(text) => {
                self.push_log("Save exported".to_string(), false);
                Some(text)
            }
            Err(e) => {
                self.notice(format!("Export failed: {e}"));
                None
            }
        }
    }

    /// Load a pasted save string and persist it.
    pub fn import_save(&mut self, text: &str) -> Result<(), PersistError> {
        let result = save::import_save_string(text).and_then(|record| {
            self.economy.restore_state(&record)?;
            Ok(())
        });
        match result {
            Ok(()) => {
                self.push_log("Save imported".to_string(), true);
                self.save_now();
                self.process_events();
                Ok(())
            }
            Err(e) => {
                self.notice(format!("Import failed: {e}"));
                Err(e)
            }
        }
    }

    /// Dispatch one key press. Returns whether it did anything.
    pub fn handle_key(&mut self, key: char) -> bool {
        let now = self.clock.now_ms();
        let handled = match self.economy.screen() {
            Screen::Menu => match key {
                'n' => {
                    self.economy.new_game(now);
                    self.autosave.reset();
                    self.push_log("New game started".to_string(), true);
                    self.save_now();
                    true
                }
                'r' | '\n' => self.economy.resume(),
                _ => false,
            },
            Screen::Main | Screen::Upgrades => match key {
                'c' => {
                    self.economy.click(ResourceId::Coins, now);
                    true
                }
                'p' if self.economy.notes_printable() => {
                    self.economy.click(ResourceId::Notes, now);
                    true
                }
                'b' => self.economy.collect_oldest_bonus().is_some(),
                'u' => {
                    if self.economy.screen() == Screen::Upgrades {
                        self.economy.show_main();
                    } else {
                        self.economy.show_upgrades();
                    }
                    true
                }
                's' => {
                    self.save_now();
                    self.push_log("Game saved".to_string(), false);
                    true
                }
                'm' => {
                    self.save_now();
                    self.economy.enter_menu();
                    true
                }
                k => match UpgradeId::from_key(k) {
                    Some(id) if self.economy.screen() == Screen::Upgrades => {
                        let bought = self.economy.purchase(id);
                        if !bought && self.economy.is_unlocked(id) {
                            self.push_log(format!("Not enough for {}", id.name()), false);
                        }
                        bought
                    }
                    _ => false,
                },
            },
        };
        self.process_events();
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{MemoryStore, SaveRecord};

    struct BrokenStore;

    impl SaveStore for BrokenStore {
        fn save(&mut self, _record: &SaveRecord) -> Result<(), PersistError> {
            Err(PersistError::StorageUnavailable)
        }
        fn load(&self) -> Result<Option<SaveRecord>, PersistError> {
            Err(PersistError::StorageUnavailable)
        }
        fn clear(&mut self) -> Result<(), PersistError> {
            Err(PersistError::StorageUnavailable)
        }
    }

    fn app() -> App {
        App::new(EconomyConfig::default(), Box::new(MemoryStore::new()), 5)
    }

    fn started() -> App {
        let mut a = app();
        a.frame(0.0);
        assert!(a.handle_key('n'));
        a
    }

    #[test]
    fn menu_without_save_cannot_resume() {
        let mut a = app();
        assert!(!a.can_resume());
        assert!(!a.handle_key('r'));
        assert_eq!(a.economy.screen(), Screen::Menu);
    }

    #[test]
    fn new_game_enters_main_and_saves() {
        let a = started();
        assert_eq!(a.economy.screen(), Screen::Main);
        assert!(a.can_resume());
    }

    #[test]
    fn click_key_awards_first_click() {
        let mut a = started();
        assert!(a.handle_key('c'));
        assert!((a.economy.resource(ResourceId::Coins).get() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn upgrade_keys_only_on_upgrade_screen() {
        let mut a = started();
        a.economy.resource_mut(ResourceId::Coins).set(100.0);
        assert!(!a.handle_key('1'));
        assert!(a.handle_key('u'));
        assert_eq!(a.economy.screen(), Screen::Upgrades);
        assert!(a.handle_key('1'));
        assert_eq!(a.economy.ledger(UpgradeId::BetterClicks).purchase_count(), 1);
        assert!(a.log().any(|l| l.text.starts_with("Bought Better Clicks")));
    }

    #[test]
    fn menu_round_trip_resumes_last_screen() {
        let mut a = started();
        a.handle_key('u');
        a.handle_key('m');
        assert_eq!(a.economy.screen(), Screen::Menu);
        assert!(a.handle_key('r'));
        assert_eq!(a.economy.screen(), Screen::Upgrades);
    }

    #[test]
    fn frames_drive_generators() {
        let mut a = started();
        a.economy.resource_mut(ResourceId::Coins).set(15.0);
        a.handle_key('u');
        assert!(a.handle_key('3'));
        a.frame(1_000.0);
        assert!((a.economy.resource(ResourceId::Coins).get() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn broken_store_becomes_notices() {
        let mut a = App::new(EconomyConfig::default(), Box::new(BrokenStore), 5);
        assert!(a.log().any(|l| l.is_important && l.text.starts_with("Could not load save")));
        a.frame(0.0);
        a.handle_key('n');
        assert!(a.log().any(|l| l.text.starts_with("Save failed")));
        assert_eq!(a.economy.screen(), Screen::Main);
    }

    #[test]
    fn failed_saves_still_allow_resume() {
        let mut a = App::new(EconomyConfig::default(), Box::new(BrokenStore), 5);
        a.frame(0.0);
        assert!(a.handle_key('n'));
        a.economy.resource_mut(ResourceId::Coins).set(500.0);
        assert!(a.handle_key('m'));
        assert_eq!(a.economy.screen(), Screen::Menu);
        assert!(a.can_resume());
        assert!(a.handle_key('r'));
        assert_eq!(a.economy.screen(), Screen::Main);
        assert!((a.economy.resource(ResourceId::Coins).get() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn saved_game_resumes_after_restart() {
        let mut store = MemoryStore::new();
        {
            let mut e = GameEconomy::new(EconomyConfig::default(), 1);
            e.new_game(0);
            e.resource_mut(ResourceId::Coins).set(42.0);
            save::save_to(&mut store, &e).unwrap();
        }
        let mut a = App::new(EconomyConfig::default(), Box::new(store), 5);
        assert!(a.can_resume());
        assert!(a.handle_key('\n'));
        assert!((a.economy.resource(ResourceId::Coins).get() - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn autosave_after_interval() {
        let mut a = App::new(EconomyConfig::default(), Box::new(BrokenStore), 5);
        a.frame(0.0);
        a.handle_key('n');
        let failures = |a: &App| a.log().filter(|l| l.text.starts_with("Save failed")).count();
        let before = failures(&a);
        a.frame(60_000.0);
        assert_eq!(failures(&a), before);
        a.frame(120_000.0);
        assert_eq!(failures(&a), before + 1);
    }

    #[test]
    fn export_import_round_trip() {
        let mut a = started();
        a.economy.resource_mut(ResourceId::Coins).set(1_234.0);
        let text = a.export_save();
        let text = text.expect("exported");
        let mut b = app();
        assert!(b.import_save(&text).is_ok());
        assert!((b.economy.resource(ResourceId::Coins).get() - 1_234.0).abs() < f64::EPSILON);
        assert!(b.can_resume());
    }

    #[test]
    fn bad_import_leaves_state_alone() {
        let mut a = started();
        a.economy.resource_mut(ResourceId::Coins).set(50.0);
        assert!(a.import_save("{\"version\":99,\"coins\":1}").is_err());
        assert!((a.economy.resource(ResourceId::Coins).get() - 50.0).abs() < f64::EPSILON);
        assert!(a.log().any(|l| l.text.starts_with("Import failed")));
    }

    #[test]
    fn amount_labels_follow_changes() {
        let mut a = started();
        assert_eq!(a.amount_label(ResourceId::Coins), "0");
        a.economy.resource_mut(ResourceId::Coins).set(1_500.0);
        assert_eq!(a.amount_label(ResourceId::Coins), "0");
        a.frame(16.0);
        assert_eq!(a.amount_label(ResourceId::Coins), "1.5K");
        assert!(!a.economy.resource_mut(ResourceId::Coins).take_dirty());
    }

    #[test]
    fn log_is_capped() {
        let mut a = started();
        for _ in 0..(LOG_CAPACITY + 20) {
            a.handle_key('s');
        }
        assert_eq!(a.log().count(), LOG_CAPACITY);
    }
}
