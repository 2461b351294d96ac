//! Configuration for LumaCanvas
//!
//! Supports JSON and TOML files. The default location is
//! `<config dir>/lumacanvas/config.toml`.
//!
//! Configuration is organized into logical sections:
//! - Engine selection, service endpoints and request options
//! - Polling budget of remote jobs
//! - History limits
//! - Viewport defaults and wheel zoom factors
//! - Export location and file-name suffix

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use lumacanvas_core::constants::{
    DEFAULT_SAFETY_TOLERANCE, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, EXPORT_SUFFIX,
    HISTORY_CAPACITY, HISTORY_DEBOUNCE_MS, MAX_POLL_ATTEMPTS, POLL_INTERVAL_MS, WHEEL_ZOOM_IN,
    WHEEL_ZOOM_OUT,
};
use lumacanvas_core::Size;
use lumacanvas_editor::{PlacementLimits, SessionConfig};
use lumacanvas_transform::{Engine, OrchestratorConfig, ServiceEndpoints};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Remote engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Selected engine
    pub engine: Engine,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Safety tolerance sent with each request
    pub safety_tolerance: u8,
    /// Requested output format
    pub output_format: String,
    /// Let the service rewrite the prompt
    pub prompt_upsampling: bool,
    /// Per-request network timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Service endpoints
    pub endpoints: ServiceEndpoints,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            api_key_env: "BFL_API_KEY".to_string(),
            safety_tolerance: DEFAULT_SAFETY_TOLERANCE,
            output_format: "png".to_string(),
            prompt_upsampling: false,
            request_timeout_ms: 30_000,
            endpoints: ServiceEndpoints::default(),
        }
    }
}

impl EngineSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Remote job polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Delay between polls in milliseconds
    pub interval_ms: u64,
    /// Polls before giving up
    pub max_attempts: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: POLL_INTERVAL_MS,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Undo history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of snapshots
    pub capacity: usize,
    /// Debounce window in milliseconds
    pub debounce_ms: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
            debounce_ms: HISTORY_DEBOUNCE_MS,
        }
    }
}

/// Viewport defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Initial viewport width
    pub width: f64,
    /// Initial viewport height
    pub height: f64,
    /// Zoom factor when scrolling up
    pub wheel_zoom_in: f64,
    /// Zoom factor when scrolling down
    pub wheel_zoom_out: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
            wheel_zoom_in: WHEEL_ZOOM_IN,
            wheel_zoom_out: WHEEL_ZOOM_OUT,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Output directory
    pub directory: PathBuf,
    /// Appended to the file stem of exported images
    pub suffix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            suffix: EXPORT_SUFFIX.to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineSettings,
    pub polling: PollingSettings,
    pub history: HistorySettings,
    pub viewport: ViewportSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location.
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("lumacanvas").join("config.toml"))
            .ok_or(SettingsError::NoConfigDirectory)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::read(path, e))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::write(path, e))?;

        tracing::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Load `path`, or the default location when `path` is `None`.
    /// A missing file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            tracing::info!(
                "No configuration at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        // Engine
        if self.engine.api_key_env.trim().is_empty() {
            return Err(ConfigError::MissingValue("engine.api_key_env".to_string()));
        }
        if self.engine.output_format.trim().is_empty() {
            return Err(ConfigError::MissingValue("engine.output_format".to_string()));
        }
        if self.engine.request_timeout_ms == 0 {
            return Err(ConfigError::out_of_range("engine.request_timeout_ms", 0));
        }

        // Polling
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::out_of_range("polling.interval_ms", 0));
        }
        if self.polling.max_attempts == 0 {
            return Err(ConfigError::out_of_range("polling.max_attempts", 0));
        }

        // History
        if self.history.capacity == 0 {
            return Err(ConfigError::out_of_range("history.capacity", 0));
        }

        // Viewport
        let size = Size::new(self.viewport.width, self.viewport.height);
        if !size.is_valid() {
            return Err(ConfigError::out_of_range("viewport", size));
        }
        for (key, factor) in [
            ("viewport.wheel_zoom_in", self.viewport.wheel_zoom_in),
            ("viewport.wheel_zoom_out", self.viewport.wheel_zoom_out),
        ] {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(ConfigError::out_of_range(key, factor));
            }
        }

        Ok(())
    }

    /// Editor session settings derived from this config.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            viewport_size: Size::new(self.viewport.width, self.viewport.height),
            history_capacity: self.history.capacity,
            history_debounce_ms: self.history.debounce_ms,
            wheel_zoom_in: self.viewport.wheel_zoom_in,
            wheel_zoom_out: self.viewport.wheel_zoom_out,
            placement: PlacementLimits::default(),
            export_suffix: self.export.suffix.clone(),
        }
    }

    /// Orchestrator settings derived from this config.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            engine: self.engine.engine,
            poll_interval: self.polling.interval(),
            max_attempts: self.polling.max_attempts,
            safety_tolerance: self.engine.safety_tolerance,
            output_format: self.engine.output_format.clone(),
            prompt_upsampling: self.engine.prompt_upsampling,
        }
    }
}
