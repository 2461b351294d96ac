//! Error types for the settings crate.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or writing configuration files.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The platform reports no per-user configuration directory.
    #[error("No configuration directory on this platform")]
    NoConfigDirectory,

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Cannot encode TOML: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl SettingsError {
    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        SettingsError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        SettingsError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A configuration that parsed but cannot be used.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Only `.toml` and `.json` are understood.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },

    #[error("Missing configuration value: {0}")]
    MissingValue(String),
}

impl ConfigError {
    pub(crate) fn out_of_range(key: &str, value: impl ToString) -> Self {
        ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
