//! Configuration management with validation and defaults
//!
//! Defaults reproduce the classic table: a 1,000,000 coin purse, 10/50/100
//! chips, five rounds of history and a two-second shake.

use crate::errors::{BauCuaResult, ConfigurationError};
use crate::games::history::DEFAULT_HISTORY_CAPACITY;
use crate::games::types::MAX_TABLE_STAKE;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Top-level game configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub table: TableConfig,
    pub animation: AnimationConfig,
    pub draw: DrawConfig,
    pub logging: LoggingConfig,
}

/// Table rules that are not odds
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub starting_balance: u64,
    pub history_capacity: usize,
    /// Chip values offered by front-ends
    pub chip_denominations: Vec<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1_000_000,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            chip_denominations: vec![10, 50, 100],
        }
    }
}

/// Cadence of the preview/reveal phases
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub preview_frames: u32,
    pub preview_interval_ms: u64,
    pub reveal_delay_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            preview_frames: 21,
            preview_interval_ms: 100,
            reveal_delay_ms: 1_000,
        }
    }
}

impl AnimationConfig {
    /// No previews and no waiting
    pub fn instant() -> Self {
        Self {
            preview_frames: 0,
            preview_interval_ms: 0,
            reveal_delay_ms: 0,
        }
    }

    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(self.preview_interval_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Fixed seed for reproducible sessions; entropy when absent
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl GameConfig {
    /// Defaults with the shake animation switched off
    pub fn instant() -> Self {
        Self {
            animation: AnimationConfig::instant(),
            ..Default::default()
        }
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.table.starting_balance > MAX_TABLE_STAKE {
            return Err(invalid(
                "table.starting_balance",
                &self.table.starting_balance.to_string(),
                &format!("Starting balance may not exceed {}", MAX_TABLE_STAKE),
            ));
        }

        if self.table.history_capacity == 0 {
            return Err(invalid(
                "table.history_capacity",
                "0",
                "History must keep at least one round",
            ));
        }

        if self.table.chip_denominations.is_empty() {
            return Err(ConfigurationError::ValidationFailed(
                "table.chip_denominations must not be empty".to_string(),
            ));
        }

        if let Some(chip) = self.table.chip_denominations.iter().find(|&&c| c == 0) {
            return Err(invalid(
                "table.chip_denominations",
                &chip.to_string(),
                "Chips must be worth more than zero",
            ));
        }

        if self.animation.preview_frames > 0 && self.animation.preview_interval_ms == 0 {
            return Err(invalid(
                "animation.preview_interval_ms",
                "0",
                "Preview frames need a non-zero interval",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> BauCuaResult<GameConfig> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Like `load`, reading overrides through `lookup` instead of the process
    /// environment
    pub fn load_with<F>(&self, lookup: F) -> BauCuaResult<GameConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => GameConfig::default(),
        };

        apply_overrides(&mut config, lookup)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> BauCuaResult<GameConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    /// Save configuration to file
    pub fn save(&self, config: &GameConfig, path: &str) -> BauCuaResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

fn apply_overrides<F>(config: &mut GameConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(balance) = lookup("BAUCUA_STARTING_BALANCE") {
        config.table.starting_balance = parse_env("BAUCUA_STARTING_BALANCE", balance)?;
    }
    if let Some(seed) = lookup("BAUCUA_SEED") {
        config.draw.seed = Some(parse_env("BAUCUA_SEED", seed)?);
    }
    if let Some(interval) = lookup("BAUCUA_PREVIEW_INTERVAL_MS") {
        config.animation.preview_interval_ms = parse_env("BAUCUA_PREVIEW_INTERVAL_MS", interval)?;
    }
    if let Some(delay) = lookup("BAUCUA_REVEAL_DELAY_MS") {
        config.animation.reveal_delay_ms = parse_env("BAUCUA_REVEAL_DELAY_MS", delay)?;
    }
    if let Some(level) = lookup("BAUCUA_LOG_LEVEL") {
        config.logging.level = parse_env("BAUCUA_LOG_LEVEL", level)?;
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(field: &str, value: String) -> Result<T, ConfigurationError> {
    value.parse().map_err(|_| ConfigurationError::InvalidValue {
        field: field.to_string(),
        value,
        reason: "Could not parse value".to_string(),
    })
}

/// Write the default configuration to `path`
pub fn generate_sample_config(path: &str) -> BauCuaResult<()> {
    ConfigLoader::new().save(&GameConfig::default(), path)
}
