// Configuration management for the liquidation race simulator

use crate::core::types::Track;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_standard_fail_rate")]
    pub standard_fail_rate: f64, // Contested execution loses most races
    #[serde(default = "default_raiku_fail_rate")]
    pub raiku_fail_rate: f64, // Guaranteed execution
    #[serde(default = "default_race_profit")]
    pub race_profit: f64, // Profit per success in the paired race
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_liq_threshold")]
    pub liq_threshold: f64,
    #[serde(default = "default_aot_threshold")]
    pub aot_threshold: f64,
    #[serde(default = "default_health_range")]
    pub health_range: [f64; 2],
    #[serde(default = "default_profit_range")]
    pub profit_range: [f64; 2],
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_standard_delay")]
    pub standard_delay_ms: u64,
    #[serde(default = "default_raiku_delay")]
    pub raiku_delay_ms: u64,
    #[serde(default = "default_aot_delay")]
    pub aot_delay_ms: u64,
    #[serde(default = "default_round_delay")]
    pub round_delay_ms: u64, // Pause between paired race rounds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub log_events: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default value functions
fn default_standard_fail_rate() -> f64 { 0.65 }
fn default_raiku_fail_rate() -> f64 { 0.0 }
fn default_race_profit() -> f64 { 12.50 }
fn default_pool_size() -> usize { 15 }
fn default_liq_threshold() -> f64 { 1.05 }
fn default_aot_threshold() -> f64 { 1.20 }
fn default_health_range() -> [f64; 2] { [0.95, 1.25] }
fn default_profit_range() -> [f64; 2] { [10.0, 50.0] }
fn default_assets() -> Vec<String> {
    ["SOL", "USDC", "mSOL", "RAY", "BONK"].iter().map(|s| s.to_string()).collect()
}
fn default_standard_delay() -> u64 { 800 }
fn default_raiku_delay() -> u64 { 400 }
fn default_aot_delay() -> u64 { 1500 }
fn default_round_delay() -> u64 { 250 }
fn default_log_level() -> String { "info".to_string() }
fn default_true() -> bool { true }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            standard_fail_rate: default_standard_fail_rate(),
            raiku_fail_rate: default_raiku_fail_rate(),
            race_profit: default_race_profit(),
            pool_size: default_pool_size(),
            liq_threshold: default_liq_threshold(),
            aot_threshold: default_aot_threshold(),
            health_range: default_health_range(),
            profit_range: default_profit_range(),
            assets: default_assets(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            standard_delay_ms: default_standard_delay(),
            raiku_delay_ms: default_raiku_delay(),
            aot_delay_ms: default_aot_delay(),
            round_delay_ms: default_round_delay(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_events: true,
        }
    }
}

impl SimulationConfig {
    pub fn fail_rate(&self, track: Track) -> f64 {
        match track {
            Track::Standard => self.standard_fail_rate,
            Track::Raiku => self.raiku_fail_rate,
        }
    }

    pub fn health_range(&self) -> Range<f64> {
        self.health_range[0]..self.health_range[1]
    }

    pub fn profit_range(&self) -> Range<f64> {
        self.profit_range[0]..self.profit_range[1]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, rate) in [
            ("standard_fail_rate", self.standard_fail_rate),
            ("raiku_fail_rate", self.raiku_fail_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Validation(format!("{} must be between 0.0 and 1.0", name)));
            }
        }

        for (name, value) in [
            ("race_profit", self.race_profit),
            ("liq_threshold", self.liq_threshold),
            ("aot_threshold", self.aot_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Validation(format!("{} must be a finite number", name)));
            }
        }

        if self.race_profit < 0.0 {
            return Err(ConfigError::Validation("race_profit must be non-negative".to_string()));
        }

        if self.pool_size == 0 {
            return Err(ConfigError::Validation("pool_size must be greater than 0".to_string()));
        }

        if self.liq_threshold >= self.aot_threshold {
            return Err(ConfigError::Validation(
                "liq_threshold must be below aot_threshold".to_string(),
            ));
        }

        for (name, [low, high]) in [("health_range", self.health_range), ("profit_range", self.profit_range)] {
            if !(low.is_finite() && high.is_finite()) || low >= high {
                return Err(ConfigError::Validation(format!("{} must be [low, high] with low < high", name)));
            }
        }

        if self.profit_range[0] < 0.0 {
            return Err(ConfigError::Validation("profit_range must be non-negative".to_string()));
        }

        if self.assets.is_empty() {
            return Err(ConfigError::Validation("assets must not be empty".to_string()));
        }

        Ok(())
    }
}

impl TimingConfig {
    pub fn track_delay(&self, track: Track) -> Duration {
        match track {
            Track::Standard => Duration::from_millis(self.standard_delay_ms),
            Track::Raiku => Duration::from_millis(self.raiku_delay_ms),
        }
    }

    pub fn aot_delay(&self) -> Duration {
        Duration::from_millis(self.aot_delay_ms)
    }

    pub fn round_delay(&self) -> Duration {
        Duration::from_millis(self.round_delay_ms)
    }

    /// No delays at all, for batch runs and tests
    pub fn instant() -> Self {
        Self {
            standard_delay_ms: 0,
            raiku_delay_ms: 0,
            aot_delay_ms: 0,
            round_delay_ms: 0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or create default if file doesn't exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.to_file(&path)?;
            tracing::info!("📁 Created default config file: {}", path.as_ref().display());
            Ok(config)
        }
    }

    /// Load configuration from file, falling back to defaults when absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::FileNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;

        if self.logging.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Validation(format!(
                "unknown log_level '{}'",
                self.logging.log_level
            )));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.fail_rate(Track::Standard), 0.65);
        assert_eq!(config.simulation.fail_rate(Track::Raiku), 0.0);
        assert_eq!(config.simulation.pool_size, 15);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[simulation]\npool_size = 4\n").unwrap();
        assert_eq!(config.simulation.pool_size, 4);
        assert_eq!(config.simulation.race_profit, 12.50);
        assert_eq!(config.timing.aot_delay_ms, 1500);
        assert_eq!(config.logging.log_level, "info");
    }

    #[test]
    fn test_thresholds_must_be_ordered() {
        let mut config = Config::default();
        config.simulation.liq_threshold = 1.20;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut config = Config::default();
        config.simulation.race_profit = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.simulation.liq_threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.aot_threshold = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fail_rate_bounds() {
        let mut config = Config::default();
        config.simulation.standard_fail_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_log_level() {
        let mut config = Config::default();
        config.logging.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
