// Simulation Runner
// Resolves submitted attempts after their track's delay, guarded by pool generation

use crate::config::TimingConfig;
use crate::core::pool::classify;
use crate::core::simulator::{AttemptTicket, LiquidationSimulator, SweepPolicy};
use crate::core::types::{AttemptReport, Position, RiskClass, Track};
use crate::error::{SimError, SimResult};
use futures_util::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Handle to a delayed resolution. Yields `None` when the pool was reset or
/// the other track won while it was waiting.
pub type PendingAttempt = JoinHandle<SimResult<Option<AttemptReport>>>;

/// Drives a shared simulator with tokio timers
#[derive(Clone)]
pub struct SimulationRunner {
    simulator: Arc<Mutex<LiquidationSimulator>>,
    timing: TimingConfig,
}

impl SimulationRunner {
    pub fn new(simulator: LiquidationSimulator, timing: TimingConfig) -> Self {
        Self {
            simulator: Arc::new(Mutex::new(simulator)),
            timing,
        }
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Run `f` with exclusive access to the simulator
    pub fn with_simulator<R>(&self, f: impl FnOnce(&mut LiquidationSimulator) -> R) -> SimResult<R> {
        let mut simulator = self.simulator.lock()?;
        Ok(f(&mut *simulator))
    }

    pub fn pool(&self) -> SimResult<Vec<Position>> {
        self.with_simulator(|sim| sim.pool().to_vec())
    }

    pub fn generation(&self) -> SimResult<u64> {
        self.with_simulator(|sim| sim.generation())
    }

    /// Reset and deal a fresh pool. Attempts still waiting on their timers
    /// belong to the old generation and will be discarded.
    pub fn restart(&self) -> SimResult<Vec<Position>> {
        self.with_simulator(|sim| sim.restart().map(|pool| pool.to_vec()))?
    }

    pub fn reset(&self) -> SimResult<()> {
        self.with_simulator(|sim| sim.reset())
    }

    /// Submit now, resolve after the track's delay
    pub fn spawn_attempt(&self, id: u32, track: Track) -> SimResult<PendingAttempt> {
        let ticket = self.with_simulator(|sim| sim.submit(id, track))??;
        debug!("⏳ #{} submitted on {} track", id, track);
        Ok(self.spawn_resolution(ticket, self.timing.track_delay(track)))
    }

    /// Schedule an ahead-of-time Raiku execution for an at-risk position
    pub fn spawn_ahead_of_time(&self, id: u32) -> SimResult<PendingAttempt> {
        let ticket = self.with_simulator(|sim| sim.submit_ahead_of_time(id))??;
        debug!("📅 #{} scheduled ahead of time", id);
        Ok(self.spawn_resolution(ticket, self.timing.aot_delay()))
    }

    fn spawn_resolution(&self, ticket: AttemptTicket, delay: Duration) -> PendingAttempt {
        let simulator = Arc::clone(&self.simulator);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut guard = simulator.lock()?;
            guard.resolve(ticket)
        })
    }

    /// Put every eligible position in flight at once and wait for all of them.
    /// Returns the resolved attempts in pool order.
    pub async fn sweep(&self, policy: SweepPolicy) -> SimResult<Vec<AttemptReport>> {
        let targets: Vec<(u32, RiskClass)> = self.with_simulator(|sim| {
            let (liq, aot) = (sim.config().liq_threshold, sim.config().aot_threshold);
            sim.pool().iter().map(|p| (p.id, classify(p, liq, aot))).collect()
        })?;

        info!("🚀 Sweeping {} positions with {} policy", targets.len(), policy);

        let plans = targets
            .into_iter()
            .map(|(id, class)| self.run_plan(id, class, policy));

        let mut reports = Vec::new();
        for result in join_all(plans).await {
            reports.extend(result?);
        }
        Ok(reports)
    }

    async fn run_plan(&self, id: u32, class: RiskClass, policy: SweepPolicy) -> SimResult<Vec<AttemptReport>> {
        let mut reports = Vec::new();

        match class {
            RiskClass::Vulnerable => {
                for &track in policy.tracks() {
                    let pending = match self.spawn_attempt(id, track) {
                        Ok(pending) => pending,
                        Err(e) if e.is_rejection() => break,
                        Err(e) => return Err(e),
                    };
                    match await_attempt(pending).await? {
                        Some(report) => {
                            let won = report.outcome.is_success();
                            reports.push(report);
                            if won {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
            RiskClass::AtRisk if policy.uses_aot() => match self.spawn_ahead_of_time(id) {
                Ok(pending) => reports.extend(await_attempt(pending).await?),
                Err(e) if e.is_rejection() => {}
                Err(e) => return Err(e),
            },
            RiskClass::AtRisk | RiskClass::Safe => {}
        }

        Ok(reports)
    }
}

/// Wait for a delayed resolution, folding task failures into `SimError`
pub async fn await_attempt(pending: PendingAttempt) -> SimResult<Option<AttemptReport>> {
    pending
        .await
        .map_err(|e| SimError::Internal(format!("attempt task failed: {}", e)))?
}
