// Common test utilities and helpers
#![allow(dead_code)]

use raiku_race_sim::{
    Config, LiquidationSimulator, ScriptedSource, SimulationConfig, TimingConfig,
};

pub const ASSETS: [&str; 5] = ["SOL", "USDC", "mSOL", "RAY", "BONK"];

/// Create a test configuration with the stock simulation values and no delays
pub fn create_test_config() -> Config {
    Config {
        simulation: SimulationConfig::default(),
        timing: TimingConfig::instant(),
        logging: Default::default(),
    }
}

/// Simulator with a fresh seeded pool
pub fn seeded_simulator(seed: u64) -> LiquidationSimulator {
    let mut sim = LiquidationSimulator::with_seed(SimulationConfig::default(), seed);
    sim.restart().expect("Failed to generate pool");
    sim
}

/// Simulator whose pool comes from `seed` but whose outcome draws are scripted.
/// Pool generation consumes three draws per position (asset, health, profit).
pub fn scripted_simulator(config: SimulationConfig, pool_draws: Vec<f64>, outcome_draws: Vec<f64>) -> LiquidationSimulator {
    let mut draws = pool_draws;
    draws.extend(outcome_draws);
    let mut sim = LiquidationSimulator::new(config, Box::new(ScriptedSource::new(draws)));
    sim.restart().expect("Failed to generate pool");
    sim
}

/// Draws that put a position at the given health inside the default range
pub fn draws_for(health: f64, profit: f64) -> Vec<f64> {
    let health_draw = (health - 0.95) / 0.30;
    let profit_draw = (profit - 10.0) / 40.0;
    vec![0.0, health_draw, profit_draw]
}
