// Simulation Engine Module
// Time-driven and batch drivers around the liquidation simulator

pub mod runner;
pub mod race;
pub mod batch;

pub use runner::{await_attempt, PendingAttempt, SimulationRunner};
pub use race::{chart_scale, clamp_rounds, RaceDashboard, RaceSummary, RoundResult, MAX_ROUNDS, MIN_ROUNDS};
pub use batch::{run_batch, BatchReport, PolicyAggregate};
