//! Monte Carlo comparison of sweep policies.
//!
//! Every trial deals a fresh pool from its own seed and sweeps it once per
//! policy, so all policies face the same positions in a given trial. Trials
//! run in parallel on the rayon pool and are deterministic for a fixed seed.

use crate::config::SimulationConfig;
use crate::core::simulator::{LiquidationSimulator, SweepPolicy, SweepReport};
use crate::error::{SimError, SimResult};
use crate::progress::BatchProgress;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAggregate {
    pub policy: SweepPolicy,
    pub trials: usize,
    pub avg_captured_profit: f64,
    pub max_captured_profit: f64,
    pub avg_missed_profit: f64,
    pub avg_capture_rate: f64,
    pub avg_liquidated: f64,
    pub attempt_success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub trials: usize,
    pub seed: u64,
    pub policies: Vec<PolicyAggregate>,
}

impl BatchReport {
    /// Policy with the highest average captured profit
    pub fn best_policy(&self) -> Option<&PolicyAggregate> {
        self.policies
            .iter()
            .max_by(|a, b| a.avg_captured_profit.total_cmp(&b.avg_captured_profit))
    }

    pub fn policy(&self, policy: SweepPolicy) -> Option<&PolicyAggregate> {
        self.policies.iter().find(|p| p.policy == policy)
    }
}

pub fn run_batch(
    config: &SimulationConfig,
    trials: usize,
    seed: u64,
    progress: &BatchProgress,
) -> SimResult<BatchReport> {
    config.validate()?;
    if trials == 0 {
        return Err(SimError::InvalidParameter(
            "trials".to_string(),
            "must be greater than 0".to_string(),
        ));
    }

    info!("🎲 Running {} trials per policy (seed {})", trials, seed);

    let policies = SweepPolicy::all()
        .into_iter()
        .map(|policy| {
            let reports = (0..trials)
                .into_par_iter()
                .map(|trial| {
                    let report = run_trial(config, policy, seed.wrapping_add(trial as u64));
                    progress.trial_done();
                    report
                })
                .collect::<SimResult<Vec<SweepReport>>>()?;
            Ok(aggregate(policy, &reports))
        })
        .collect::<SimResult<Vec<PolicyAggregate>>>()?;

    progress.finish();
    Ok(BatchReport { trials, seed, policies })
}

fn run_trial(config: &SimulationConfig, policy: SweepPolicy, seed: u64) -> SimResult<SweepReport> {
    let mut simulator = LiquidationSimulator::with_seed(config.clone(), seed);
    simulator.generate_pool()?;
    simulator.sweep(policy)
}

fn aggregate(policy: SweepPolicy, reports: &[SweepReport]) -> PolicyAggregate {
    let n = reports.len().max(1) as f64;
    let (attempts, successes) = reports.iter().fold((0u64, 0u64), |(a, s), r| {
        (
            a + r.counters.standard.attempts() + r.counters.raiku.attempts(),
            s + r.counters.standard.successes() + r.counters.raiku.successes(),
        )
    });

    PolicyAggregate {
        policy,
        trials: reports.len(),
        avg_captured_profit: reports.iter().map(|r| r.captured_profit).sum::<f64>() / n,
        max_captured_profit: reports.iter().map(|r| r.captured_profit).fold(0.0, f64::max),
        avg_missed_profit: reports.iter().map(|r| r.missed_profit).sum::<f64>() / n,
        avg_capture_rate: reports.iter().map(|r| r.capture_rate()).sum::<f64>() / n,
        avg_liquidated: reports.iter().map(|r| r.liquidated as f64).sum::<f64>() / n,
        attempt_success_rate: if attempts == 0 {
            0.0
        } else {
            successes as f64 / attempts as f64
        },
    }
}
