//! Save/load.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: current record layout. Bump when fields are added.
//! - `MIN_COMPATIBLE_VERSION`: oldest layout still understood. Only raise it
//!   for breaking changes (a field removed or its meaning changed).
//!
//! v2 added `unitsOwned` per upgrade. v1 records restore generator units from
//! the purchase count.
//!
//! Every field except `version` is optional on read. A missing field leaves
//! the corresponding economy state untouched, so a partial record layers onto
//! whatever is already loaded. Costs are never stored; they are recomputed
//! from purchase counts.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::economy::resource::ResourceId;
use crate::economy::upgrades::{Effect, UpgradeId};
use crate::economy::GameEconomy;
use crate::error::{PersistError, RestoreError};

pub const SAVE_VERSION: u32 = 2;

pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// Persisted state of one upgrade.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeSave {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    /// Generator upgrades only (v2+).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub units_owned: Option<f64>,
}

/// The persisted economy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub version: u32,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub coins: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub coins_increment_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub manual_multiplier_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub auto_multiplier_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub notes: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub notes_increment_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub note_manual_multiplier_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub note_auto_multiplier_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub note_tech_revealed: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_upgrades",
        skip_serializing_if = "Option::is_none"
    )]
    pub upgrades: Option<BTreeMap<String, UpgradeSave>>,
}

impl SaveRecord {
    /// A record carrying only a version; restoring it changes nothing.
    pub fn empty(version: u32) -> Self {
        Self {
            version,
            coins: None,
            coins_increment_value: None,
            manual_multiplier_rate: None,
            auto_multiplier_rate: None,
            notes: None,
            notes_increment_value: None,
            note_manual_multiplier_rate: None,
            note_auto_multiplier_rate: None,
            note_tech_revealed: None,
            upgrades: None,
        }
    }
}

/// A field of the wrong type reads as absent instead of failing the record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            tracing::warn!(error = %e, "malformed save field ignored");
            Ok(None)
        }
    }
}

/// Per-entry [`lenient`]: a malformed upgrade entry is dropped, the rest kept.
fn lenient_upgrades<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, UpgradeSave>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(None),
        other => {
            tracing::warn!(found = %other, "save upgrades is not an object, ignored");
            return Ok(None);
        }
    };
    let mut upgrades = BTreeMap::new();
    for (key, value) in entries {
        match serde_json::from_value::<UpgradeSave>(value) {
            Ok(save) => {
                upgrades.insert(key, save);
            }
            Err(e) => {
                tracing::warn!(id = key.as_str(), error = %e, "malformed upgrade entry ignored")
            }
        }
    }
    Ok(Some(upgrades))
}

/// Reject versions this build cannot read.
pub fn check_version(version: u32) -> Result<(), RestoreError> {
    if version < MIN_COMPATIBLE_VERSION {
        return Err(RestoreError::TooOld {
            found: version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if version > SAVE_VERSION {
        return Err(RestoreError::FromFuture {
            found: version,
            max: SAVE_VERSION,
        });
    }
    Ok(())
}

/// Finite, non-negative, or nothing.
fn amount(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite()).map(|x| x.max(0.0))
}

/// Finite and clamped to at least 1.
fn at_least_one(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite()).map(|x| x.max(1.0))
}

fn rate(v: Option<f64>) -> Option<u32> {
    at_least_one(v).map(|x| x.min(f64::from(u32::MAX)).floor() as u32)
}

fn count(v: Option<f64>) -> Option<u32> {
    amount(v).map(|x| x.min(f64::from(u32::MAX)).floor() as u32)
}

impl GameEconomy {
    /// Snapshot everything worth persisting.
    pub fn capture_state(&self) -> SaveRecord {
        let coins = self.currency(ResourceId::Coins);
        let notes = self.currency(ResourceId::Notes);
        let upgrades = self
            .upgrades
            .iter()
            .map(|u| {
                let units_owned = match u.id.effect() {
                    Effect::GeneratorUnits(c) => Some(self.generator(c).units_owned() as f64),
                    _ => None,
                };
                let save = UpgradeSave {
                    count: Some(f64::from(u.ledger.purchase_count())),
                    units_owned,
                };
                (u.id.as_str().to_string(), save)
            })
            .collect();

        SaveRecord {
            version: SAVE_VERSION,
            coins: Some(coins.resource().get()),
            coins_increment_value: Some(coins.increment_value()),
            manual_multiplier_rate: Some(f64::from(coins.manual_multiplier_rate())),
            auto_multiplier_rate: Some(f64::from(coins.auto_multiplier_rate())),
            notes: Some(notes.resource().get()),
            notes_increment_value: Some(notes.increment_value()),
            note_manual_multiplier_rate: Some(f64::from(notes.manual_multiplier_rate())),
            note_auto_multiplier_rate: Some(f64::from(notes.auto_multiplier_rate())),
            note_tech_revealed: Some(self.note_tech_revealed),
            upgrades: Some(upgrades),
        }
    }

    /// Apply a save record. The version is checked before anything changes.
    pub fn restore_state(&mut self, record: &SaveRecord) -> Result<(), RestoreError> {
        check_version(record.version)?;
        if record.version < SAVE_VERSION {
            tracing::info!(
                saved = record.version,
                current = SAVE_VERSION,
                "migrating older save"
            );
        }

        // (currency, stock, increment value, manual rate, auto rate)
        let fields = [
            (
                ResourceId::Coins,
                record.coins,
                record.coins_increment_value,
                record.manual_multiplier_rate,
                record.auto_multiplier_rate,
            ),
            (
                ResourceId::Notes,
                record.notes,
                record.notes_increment_value,
                record.note_manual_multiplier_rate,
                record.note_auto_multiplier_rate,
            ),
        ];
        for (id, stock, increment, manual, auto) in fields {
            let c = &mut self.currencies[id.index()];
            if let Some(v) = amount(stock) {
                c.resource.set(v);
            }
            if let Some(v) = at_least_one(increment) {
                c.increment_value = v;
            }
            if let Some(v) = rate(manual) {
                c.manual_multiplier_rate = v;
            }
            if let Some(v) = rate(auto) {
                c.auto_multiplier_rate = v;
            }
        }

        if let Some(revealed) = record.note_tech_revealed {
            self.note_tech_revealed = revealed;
        }

        if let Some(saved) = &record.upgrades {
            for (key, save) in saved {
                let Some(id) = UpgradeId::parse(key) else {
                    tracing::warn!(id = key.as_str(), "unknown upgrade in save, skipped");
                    continue;
                };
                let restored = count(save.count);
                let idx = UpgradeId::all().iter().position(|u| *u == id).unwrap_or_default();
                if let Some(n) = restored {
                    self.upgrades[idx].ledger.restore(n);
                }
                if let Effect::GeneratorUnits(c) = id.effect() {
                    let units = amount(save.units_owned)
                        .map(|x| x.floor() as u64)
                        .or(restored.map(u64::from));
                    if let Some(units) = units {
                        self.currencies[c.index()].generator.restore(units);
                    }
                }
            }
        }

        self.notes_printable = self.ledger(UpgradeId::NotePrintingTech).purchase_count() > 0;
        if self.notes_printable {
            self.note_tech_revealed = true;
        }
        self.started = true;
        self.refresh_affordability();
        Ok(())
    }
}

/// Serialize for copy/paste export.
pub fn export_save_string(record: &SaveRecord) -> Result<String, PersistError> {
    serde_json::to_string(record).map_err(PersistError::Serialize)
}

/// Parse pasted text. The version is validated; nothing is applied.
pub fn import_save_string(text: &str) -> Result<SaveRecord, PersistError> {
    let record: SaveRecord = serde_json::from_str(text.trim()).map_err(PersistError::Parse)?;
    check_version(record.version)?;
    Ok(record)
}

/// Where save records live.
pub trait SaveStore {
    fn save(&mut self, record: &SaveRecord) -> Result<(), PersistError>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<SaveRecord>, PersistError>;
    fn clear(&mut self) -> Result<(), PersistError>;
}

/// Keeps the serialized record in memory. Used by tests and native builds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with raw text, valid or not.
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn save(&mut self, record: &SaveRecord) -> Result<(), PersistError> {
        self.json = Some(export_save_string(record)?);
        Ok(())
    }

    fn load(&self) -> Result<Option<SaveRecord>, PersistError> {
        self.json.as_deref().map(import_save_string).transpose()
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        self.json = None;
        Ok(())
    }
}

/// Browser `localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(PersistError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorageStore {
    fn save(&mut self, record: &SaveRecord) -> Result<(), PersistError> {
        let json = export_save_string(record)?;
        Self::storage()?
            .set_item(&self.key, &json)
            .map_err(|e| PersistError::Storage(format!("{e:?}")))
    }

    fn load(&self) -> Result<Option<SaveRecord>, PersistError> {
        let json = Self::storage()?
            .get_item(&self.key)
            .map_err(|e| PersistError::Storage(format!("{e:?}")))?;
        json.as_deref().map(import_save_string).transpose()
    }

    fn clear(&mut self) -> Result<(), PersistError> {
        Self::storage()?
            .remove_item(&self.key)
            .map_err(|e| PersistError::Storage(format!("{e:?}")))
    }
}

/// Write the economy to `store`.
pub fn save_to(store: &mut dyn SaveStore, economy: &GameEconomy) -> Result<(), PersistError> {
    store.save(&economy.capture_state())?;
    tracing::debug!("game saved");
    Ok(())
}

/// Load `store` into the economy. `Ok(false)` when there was nothing saved.
pub fn load_from(store: &dyn SaveStore, economy: &mut GameEconomy) -> Result<bool, PersistError> {
    match store.load()? {
        Some(record) => {
            economy.restore_state(&record)?;
            tracing::info!(version = record.version, "save loaded");
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Fires every `interval_ms` of accumulated tick time.
#[derive(Clone, Debug)]
pub struct AutosaveTimer {
    interval_ms: f64,
    elapsed_ms: f64,
}

impl AutosaveTimer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(1.0),
            elapsed_ms: 0.0,
        }
    }

    /// Returns `true` once per elapsed interval.
    pub fn tick(&mut self, delta_ms: f64) -> bool {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.elapsed_ms += delta_ms;
        }
        if self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }
}
