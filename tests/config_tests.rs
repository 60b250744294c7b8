// Integration tests for configuration loading and validation

mod common;

use common::create_test_config;
use raiku_race_sim::{Config, ConfigError, SimError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_config_values() {
    let config = create_test_config();

    assert_eq!(config.simulation.standard_fail_rate, 0.65);
    assert_eq!(config.simulation.raiku_fail_rate, 0.0);
    assert_eq!(config.simulation.race_profit, 12.50);
    assert_eq!(config.simulation.pool_size, 15);
    assert_eq!(config.simulation.liq_threshold, 1.05);
    assert_eq!(config.simulation.aot_threshold, 1.20);
    assert_eq!(config.simulation.health_range, [0.95, 1.25]);
    assert_eq!(config.simulation.profit_range, [10.0, 50.0]);
    assert_eq!(config.simulation.assets.len(), 5);
}

#[test]
fn test_config_file_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("race.toml");

    let mut config = create_test_config();
    config.simulation.pool_size = 8;
    config.simulation.standard_fail_rate = 0.4;
    config.to_file(&config_path).expect("Failed to write config");

    let loaded = Config::from_file(&config_path).expect("Failed to load config");
    assert_eq!(loaded.simulation.pool_size, 8);
    assert_eq!(loaded.simulation.standard_fail_rate, 0.4);
    assert_eq!(loaded.timing.standard_delay_ms, 0);
}

#[test]
fn test_example_config_parses() {
    let content = include_str!("../config.toml.example");
    let config: Config = toml::from_str(content).expect("Example config should parse");
    assert!(config.validate().is_ok());
    assert_eq!(config.timing.aot_delay_ms, 1500);
}

#[test]
fn test_invalid_file_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[simulation]\nhealth_range = [1.3, 1.0]\n").unwrap();

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));

    let sim_err: SimError = err.into();
    assert_eq!(sim_err.category(), "config");
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("nope.toml");

    assert!(matches!(Config::from_file(&config_path), Err(ConfigError::FileNotFound(_))));
    let fallback = Config::load_or_default(&config_path).expect("Defaults expected");
    assert_eq!(fallback.simulation.pool_size, 15);
    assert!(!config_path.exists());
}

#[test]
fn test_load_or_create_writes_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("created.toml");

    let config = Config::load_or_create(&config_path).expect("Failed to create config");
    assert!(config_path.exists());
    assert_eq!(config.simulation.pool_size, 15);

    let written = fs::read_to_string(&config_path).unwrap();
    assert!(written.contains("standard_fail_rate"));
}
