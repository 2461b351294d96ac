//! LumaCanvas Settings Crate
//!
//! Handles application configuration: the engine and service endpoints,
//! polling budget, history limits, viewport defaults and export location.

pub mod config;
pub mod error;

pub use config::{
    Config, EngineSettings, ExportSettings, HistorySettings, PollingSettings, ViewportSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
