//! Economy tuning loaded from the embedded `economy.toml`.

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::economy::bonus::BonusSettings;
use crate::economy::generator::StepPolicy;
use crate::error::ConfigError;

const EMBEDDED_CONFIG: &str = include_str!("../economy.toml");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Units per second produced by one generator unit.
    pub base_rate: f64,
    pub min_step: f64,
    pub batch_threshold: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let policy = StepPolicy::default();
        Self {
            base_rate: 1.0,
            min_step: policy.min_step,
            batch_threshold: policy.batch_threshold,
        }
    }
}

impl GeneratorConfig {
    pub fn step_policy(&self) -> StepPolicy {
        StepPolicy {
            min_step: self.min_step,
            batch_threshold: self.batch_threshold,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClicksConfig {
    /// Clicks needed per award.
    pub threshold: u32,
    pub retention_ms: u64,
}

impl Default for ClicksConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            retention_ms: 5_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusConfig {
    pub min_seconds: u32,
    pub max_seconds: u32,
    pub secondary_chance: f64,
    pub coins_min: u32,
    pub coins_max: u32,
    pub notes_min: u32,
    pub notes_max: u32,
    pub ttl_ms: f64,
}

impl Default for BonusConfig {
    fn default() -> Self {
        let s = BonusSettings::default();
        Self {
            min_seconds: s.min_seconds,
            max_seconds: s.max_seconds,
            secondary_chance: s.secondary_chance,
            coins_min: s.coins_amount.0,
            coins_max: s.coins_amount.1,
            notes_min: s.notes_amount.0,
            notes_max: s.notes_amount.1,
            ttl_ms: s.ttl_ms,
        }
    }
}

impl BonusConfig {
    pub fn settings(&self) -> BonusSettings {
        BonusSettings {
            min_seconds: self.min_seconds,
            max_seconds: self.max_seconds,
            secondary_chance: self.secondary_chance,
            coins_amount: (self.coins_min, self.coins_max),
            notes_amount: (self.notes_min, self.notes_max),
            ttl_ms: self.ttl_ms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub autosave_interval_ms: f64,
    /// `localStorage` key of the save record.
    pub storage_key: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: 120_000.0,
            storage_key: "wealthIncSave".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// The configured level, or `INFO` if it does not parse.
    pub fn level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

/// All tunable economy parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub generator: GeneratorConfig,
    pub clicks: ClicksConfig,
    pub bonus: BonusConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

impl EconomyConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EconomyConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the compiled-in `economy.toml`.
    pub fn load_embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.generator;
        if !(g.min_step.is_finite() && g.min_step > 0.0) {
            return Err(invalid(format!("generator.min_step must be > 0, got {}", g.min_step)));
        }
        if !(g.base_rate.is_finite() && g.base_rate >= 0.0) {
            return Err(invalid(format!("generator.base_rate must be >= 0, got {}", g.base_rate)));
        }
        if self.clicks.threshold == 0 {
            return Err(invalid("clicks.threshold must be at least 1".to_string()));
        }
        let b = &self.bonus;
        if b.min_seconds > b.max_seconds {
            return Err(invalid(format!(
                "bonus.min_seconds ({}) exceeds bonus.max_seconds ({})",
                b.min_seconds, b.max_seconds
            )));
        }
        if b.coins_min > b.coins_max {
            return Err(invalid("bonus.coins_min exceeds bonus.coins_max".to_string()));
        }
        if b.notes_min > b.notes_max {
            return Err(invalid("bonus.notes_min exceeds bonus.notes_max".to_string()));
        }
        if !(0.0..=1.0).contains(&b.secondary_chance) {
            return Err(invalid(format!(
                "bonus.secondary_chance must be within [0, 1], got {}",
                b.secondary_chance
            )));
        }
        if !(b.ttl_ms.is_finite() && b.ttl_ms > 0.0) {
            return Err(invalid("bonus.ttl_ms must be > 0".to_string()));
        }
        let p = &self.persistence;
        if !(p.autosave_interval_ms.is_finite() && p.autosave_interval_ms > 0.0) {
            return Err(invalid("persistence.autosave_interval_ms must be > 0".to_string()));
        }
        if p.storage_key.is_empty() {
            return Err(invalid("persistence.storage_key must not be empty".to_string()));
        }
        if self.logging.level.parse::<Level>().is_err() {
            return Err(invalid(format!("unknown logging.level {:?}", self.logging.level)));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_is_valid_and_matches_defaults() {
        let parsed = EconomyConfig::load_embedded();
        assert!(parsed.is_ok(), "{:?}", parsed.err());
        assert_eq!(parsed.unwrap(), EconomyConfig::default());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let c = EconomyConfig::from_toml_str("[bonus]\nmin_seconds = 5\nmax_seconds = 10\n").unwrap();
        assert_eq!(c.bonus.min_seconds, 5);
        assert_eq!(c.bonus.max_seconds, 10);
        assert_eq!(c.clicks.threshold, 10);
        assert!((c.generator.min_step - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EconomyConfig::from_toml_str("").unwrap(), EconomyConfig::default());
    }

    #[test]
    fn rejects_non_positive_step() {
        let r = EconomyConfig::from_toml_str("[generator]\nmin_step = 0.0\n");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_threshold() {
        let r = EconomyConfig::from_toml_str("[clicks]\nthreshold = 0\n");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_inverted_bonus_interval() {
        let r = EconomyConfig::from_toml_str("[bonus]\nmin_seconds = 300\nmax_seconds = 100\n");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_inverted_amount_range() {
        let r = EconomyConfig::from_toml_str("[bonus]\nnotes_min = 5\nnotes_max = 2\n");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_probability_out_of_range() {
        let r = EconomyConfig::from_toml_str("[bonus]\nsecondary_chance = 1.5\n");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_unknown_level() {
        let r = EconomyConfig::from_toml_str("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(r, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let r = EconomyConfig::from_toml_str("[generator\nmin_step = ");
        assert!(matches!(r, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn level_parses_case_insensitively() {
        let c = LoggingConfig {
            level: "DEBUG".to_string(),
        };
        assert_eq!(c.level(), Level::DEBUG);
    }
}
