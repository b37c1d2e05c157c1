//! # Configuration Management Module
//!
//! Centralized configuration for the interactive-state layer, with serde
//! (de)serialization from TOML, defaults for every section and validation.
//!
//! ## Configuration Structure
//!
//! - [`CoreConfig`] - tick length and stats cadence
//! - [`DelayConfig`] - movement tolerance and default cancellation triggers
//! - [`ChatConfig`] - chat capture options
//! - [`MenuConfig`] - menu size limits
//! - [`CooldownConfig`] - expired cooldown purge cadence
//! - [`HooksConfig`] - integration discovery and adapter settings
//! - [`LoggingConfig`] - logging level and file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use realmkit::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("tick = {} ms", config.core.tick_interval_ms);
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [core]
//! tick_interval_ms = 50
//!
//! [delay]
//! movement_tolerance = 1.0
//! default_triggers = ["disconnect"]
//!
//! [hooks]
//! present = ["LuckPerms", "PlaceholderAPI"]
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

use crate::delay::Trigger;
use crate::hook::HookKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub delay: DelayConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub cooldown: CooldownConfig,
    #[serde(default)]
    pub hooks: HooksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Name reported to hook adapters as the owning plugin.
    #[serde(default = "default_name")]
    pub name: String,
    /// Length of one host tick (ms). Time-based delays are converted with it.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Interval (ms) for periodic metrics logging by the ticker (0 disables).
    #[serde(default = "default_stats_interval_ms")]
    pub stats_interval_ms: u64,
}

fn default_name() -> String {
    "realmkit".to_string()
}

fn default_tick_interval_ms() -> u64 {
    50
}

fn default_stats_interval_ms() -> u64 {
    60_000
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            tick_interval_ms: default_tick_interval_ms(),
            stats_interval_ms: default_stats_interval_ms(),
        }
    }
}

impl CoreConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Blocks an entity may drift from the delay origin before the movement trigger fires.
    #[serde(default = "default_movement_tolerance")]
    pub movement_tolerance: f64,
    /// Triggers every new delay starts with unless the builder replaces them.
    #[serde(default = "default_triggers")]
    pub default_triggers: Vec<Trigger>,
}

fn default_movement_tolerance() -> f64 {
    1.0
}

fn default_triggers() -> Vec<Trigger> {
    vec![Trigger::Disconnect]
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            movement_tolerance: default_movement_tolerance(),
            default_triggers: default_triggers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Deliver captured replies with formatting codes removed.
    #[serde(default = "default_true")]
    pub strip_formatting: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            strip_formatting: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Upper bound for menu height (rows of 9 slots).
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_max_rows() -> usize {
    6
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    /// Purge expired cooldowns every N ticks (0 disables the sweep; lookups still expire lazily).
    #[serde(default = "default_cleanup_interval_ticks")]
    pub cleanup_interval_ticks: u64,
}

fn default_cleanup_interval_ticks() -> u64 {
    3600
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_ticks: default_cleanup_interval_ticks(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Dependency names the host reports as loaded. Used by the CLI probe.
    #[serde(default)]
    pub present: Vec<String>,
    /// Kinds that are never registered, even when their dependency is present.
    #[serde(default)]
    pub disabled: Vec<HookKind>,
    /// Identifier prefix for placeholders (`%prefix_name%`).
    #[serde(default = "default_placeholder_prefix")]
    pub placeholder_prefix: String,
    /// Marker set the web map adapter draws into.
    #[serde(default = "default_marker_set")]
    pub webmap_marker_set: String,
}

fn default_placeholder_prefix() -> String {
    "realm".to_string()
}

fn default_marker_set() -> String {
    "realmkit".to_string()
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            present: Vec::new(),
            disabled: Vec::new(),
            placeholder_prefix: default_placeholder_prefix(),
            webmap_marker_set: default_marker_set(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: Some("realmkit.log".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.core.tick_interval_ms == 0 {
            return Err(anyhow!("core.tick_interval_ms must be at least 1"));
        }
        if self.menu.max_rows == 0 || self.menu.max_rows > 6 {
            return Err(anyhow!(
                "menu.max_rows must be between 1 and 6 (got {})",
                self.menu.max_rows
            ));
        }
        let tolerance = self.delay.movement_tolerance;
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(anyhow!("delay.movement_tolerance must be >= 0"));
        }
        Ok(())
    }
}
