//! Error types for persistence and configuration.
//!
//! The simulation itself has no error paths: bad input is clamped and
//! unaffordable purchases return `false`. Only collaborators fail.

use thiserror::Error;

/// A save record the economy refuses to load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    #[error("save version {found} is older than the oldest supported version {min}")]
    TooOld { found: u32, min: u32 },

    #[error("save version {found} is newer than this build understands ({max})")]
    FromFuture { found: u32, max: u32 },
}

/// Failures of a save store or of save-string import/export.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("browser storage is not available")]
    StorageUnavailable,

    #[error("storage operation failed: {0}")]
    Storage(String),

    #[error("could not serialize save: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("could not parse save: {0}")]
    Parse(#[source] serde_json::Error),

    #[error(transparent)]
    Restore(#[from] RestoreError),
}

/// Configuration that could not be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
