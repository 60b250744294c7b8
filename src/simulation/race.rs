// Paired Race Dashboard
// Standard and Raiku race head to head every round for a fixed profit

use crate::config::{SimulationConfig, TimingConfig};
use crate::core::random::{RandomSource, RngSource};
use crate::core::types::{Outcome, RaceCounters, Track, TrackCounters};
use crate::error::SimResult;
use crate::progress::RaceProgress;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 100;

/// Parse a user supplied round count. Anything unparsable becomes one round;
/// numbers are clamped into `MIN_ROUNDS..=MAX_ROUNDS`.
pub fn clamp_rounds(input: &str) -> u32 {
    let trimmed = input.trim();
    let parsed = trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
        });

    match parsed {
        Some(n) => n.clamp(MIN_ROUNDS as i64, MAX_ROUNDS as i64) as u32,
        None => MIN_ROUNDS,
    }
}

/// Scale values to bar heights. The denominator never drops below 1 so an
/// all-zero series draws flat bars instead of dividing by zero.
pub fn chart_scale(values: &[f64], max_height: f64) -> Vec<f64> {
    let max = values.iter().copied().fold(0.0_f64, f64::max).max(1.0);
    values.iter().map(|v| v.max(0.0) / max * max_height).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub standard: Outcome,
    pub raiku: Outcome,
}

impl RoundResult {
    pub fn outcome(&self, track: Track) -> Outcome {
        match track {
            Track::Standard => self.standard,
            Track::Raiku => self.raiku,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSummary {
    pub rounds: usize,
    pub standard: RaceCounters,
    pub raiku: RaceCounters,
    pub standard_success_rate: f64,
    pub raiku_success_rate: f64,
    pub raiku_advantage: f64, // Extra profit captured by Raiku
    pub profit_bars: [f64; 2], // Standard, Raiku scaled to 0..=100
    pub history: Vec<RoundResult>,
}

#[derive(Debug, Default)]
struct DashboardState {
    generation: u64,
    counters: TrackCounters,
    history: Vec<RoundResult>,
}

/// Runs rounds where both tracks draw concurrently. A round is only applied
/// once both draws are in.
#[derive(Clone)]
pub struct RaceDashboard {
    config: SimulationConfig,
    timing: TimingConfig,
    rng: Arc<Mutex<Box<dyn RandomSource>>>,
    state: Arc<Mutex<DashboardState>>,
}

impl RaceDashboard {
    pub fn new(config: SimulationConfig, timing: TimingConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            timing,
            rng: Arc::new(Mutex::new(rng)),
            state: Arc::new(Mutex::new(DashboardState::default())),
        }
    }

    pub fn with_seed(config: SimulationConfig, timing: TimingConfig, seed: u64) -> Self {
        Self::new(config, timing, Box::new(RngSource::seeded(seed)))
    }

    pub fn with_entropy(config: SimulationConfig, timing: TimingConfig) -> Self {
        Self::new(config, timing, Box::new(RngSource::from_entropy()))
    }

    /// Clear counters and history. Rounds still in flight are dropped.
    pub fn reset(&self) -> SimResult<()> {
        let mut state = self.state.lock()?;
        state.generation += 1;
        state.counters = TrackCounters::default();
        state.history.clear();
        info!("🔄 Race dashboard reset");
        Ok(())
    }

    pub fn counters(&self) -> SimResult<TrackCounters> {
        Ok(self.state.lock()?.counters)
    }

    /// Run `rounds` paired rounds and summarize
    pub async fn run(&self, rounds: u32, progress: &RaceProgress) -> SimResult<RaceSummary> {
        self.config.validate()?;
        let rounds = rounds.clamp(MIN_ROUNDS, MAX_ROUNDS);
        let generation = self.state.lock()?.generation;
        info!(
            "⚔️  Racing {} rounds: Standard fail {:.0}% vs Raiku fail {:.0}%",
            rounds,
            self.config.standard_fail_rate * 100.0,
            self.config.raiku_fail_rate * 100.0
        );

        for round in 1..=rounds {
            let (standard, raiku) = tokio::join!(self.draw(Track::Standard), self.draw(Track::Raiku));
            let result = RoundResult {
                round,
                standard: standard?,
                raiku: raiku?,
            };

            if !self.apply(generation, result)? {
                warn!("⚠️  Dashboard reset mid-race, discarding round {}", round);
                progress.abandon("Race reset");
                return self.summary();
            }

            let counters = self.counters()?;
            progress.round_done(counters.standard.total_profit(), counters.raiku.total_profit());

            if round < rounds {
                tokio::time::sleep(self.timing.round_delay()).await;
            }
        }

        let summary = self.summary()?;
        progress.finish(summary.rounds);
        Ok(summary)
    }

    async fn draw(&self, track: Track) -> SimResult<Outcome> {
        tokio::time::sleep(self.timing.track_delay(track)).await;
        let draw = self.rng.lock()?.next_uniform();
        let outcome = Outcome::from_draw(draw, self.config.fail_rate(track));
        debug!("{} drew {:.4}: {:?}", track, draw, outcome);
        Ok(outcome)
    }

    // Returns false when the round belongs to a previous generation
    fn apply(&self, generation: u64, result: RoundResult) -> SimResult<bool> {
        let mut state = self.state.lock()?;
        if state.generation != generation {
            return Ok(false);
        }

        for track in Track::all() {
            state
                .counters
                .get_mut(track)
                .record(result.outcome(track), self.config.race_profit);
        }
        state.history.push(result);
        Ok(true)
    }

    pub fn summary(&self) -> SimResult<RaceSummary> {
        let state = self.state.lock()?;
        let standard = state.counters.standard;
        let raiku = state.counters.raiku;
        let bars = chart_scale(&[standard.total_profit(), raiku.total_profit()], 100.0);

        Ok(RaceSummary {
            rounds: state.history.len(),
            standard,
            raiku,
            standard_success_rate: standard.success_rate(),
            raiku_success_rate: raiku.success_rate(),
            raiku_advantage: raiku.total_profit() - standard.total_profit(),
            profit_bars: [bars[0], bars[1]],
            history: state.history.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_rounds() {
        assert_eq!(clamp_rounds("10"), 10);
        assert_eq!(clamp_rounds(" 250 "), 100);
        assert_eq!(clamp_rounds("0"), 1);
        assert_eq!(clamp_rounds("-7"), 1);
        assert_eq!(clamp_rounds("12.9"), 12);
        assert_eq!(clamp_rounds("many"), 1);
        assert_eq!(clamp_rounds(""), 1);
    }

    #[test]
    fn test_chart_scale_clamps_denominator() {
        assert_eq!(chart_scale(&[0.0, 0.0], 100.0), vec![0.0, 0.0]);
        assert_eq!(chart_scale(&[0.5, 0.25], 100.0), vec![50.0, 25.0]);
        assert_eq!(chart_scale(&[25.0, 50.0], 100.0), vec![50.0, 100.0]);
    }
}
