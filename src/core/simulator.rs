//! Liquidation outcome state machine.
//!
//! Each position carries one status per execution track. A track moves
//! `IDLE -> PENDING_* | SCHEDULED_AOT -> RESOLVED_SUCCESS | RESOLVED_FAILED`,
//! and a success on one track forces the other into `MISSED`. Only a reset
//! or a fresh pool leaves a terminal state, and both bump the generation so
//! tickets issued before it resolve to nothing.

use crate::config::SimulationConfig;
use crate::core::events::SimulatorObserver;
use crate::core::pool::{classify, generate_pool};
use crate::core::random::{RandomSource, RngSource};
use crate::core::types::{
    AttemptKind, AttemptReport, Outcome, Position, PositionStatus, RaceCounters, RiskClass, Track,
    TrackCounters,
};
use crate::error::{SimError, SimResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Claim on a submitted attempt, redeemed by `LiquidationSimulator::resolve`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptTicket {
    pub generation: u64,
    pub position_id: u32,
    pub track: Track,
    pub kind: AttemptKind,
}

pub struct LiquidationSimulator {
    config: SimulationConfig,
    pool: Vec<Position>,
    generation: u64,
    counters: TrackCounters,
    rng: Box<dyn RandomSource>,
    observers: Vec<Box<dyn SimulatorObserver>>,
}

impl LiquidationSimulator {
    pub fn new(config: SimulationConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            pool: Vec::new(),
            generation: 0,
            counters: TrackCounters::default(),
            rng,
            observers: Vec::new(),
        }
    }

    pub fn with_seed(config: SimulationConfig, seed: u64) -> Self {
        Self::new(config, Box::new(RngSource::seeded(seed)))
    }

    pub fn with_entropy(config: SimulationConfig) -> Self {
        Self::new(config, Box::new(RngSource::from_entropy()))
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulatorObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pool(&self) -> &[Position] {
        &self.pool
    }

    pub fn position(&self, id: u32) -> Option<&Position> {
        self.pool.iter().find(|p| p.id == id)
    }

    pub fn counters(&self) -> &TrackCounters {
        &self.counters
    }

    pub fn track_counters(&self, track: Track) -> &RaceCounters {
        self.counters.get(track)
    }

    pub fn classify(&self, id: u32) -> SimResult<RiskClass> {
        let position = self.position(id).ok_or(SimError::PositionNotFound(id))?;
        Ok(classify(position, self.config.liq_threshold, self.config.aot_threshold))
    }

    /// Discard the pool and zero both tracks' counters
    pub fn reset(&mut self) {
        self.generation += 1;
        self.pool.clear();
        self.counters = TrackCounters::default();

        for observer in &mut self.observers {
            observer.on_reset(self.generation);
        }
    }

    /// Replace the pool with freshly generated positions. Counters carry over.
    pub fn generate_pool(&mut self) -> SimResult<&[Position]> {
        let pool = generate_pool(
            self.config.pool_size,
            self.config.health_range(),
            self.config.profit_range(),
            &self.config.assets,
            self.rng.as_mut(),
        )?;

        self.generation += 1;
        self.pool = pool;

        for observer in &mut self.observers {
            observer.on_pool_generated(self.generation, &self.pool);
        }

        Ok(&self.pool)
    }

    /// Full reset followed by a fresh pool
    pub fn restart(&mut self) -> SimResult<&[Position]> {
        self.reset();
        self.generate_pool()
    }

    /// Commit a position to a track. The track turns pending immediately so it
    /// cannot be submitted again.
    pub fn submit(&mut self, id: u32, track: Track) -> SimResult<AttemptTicket> {
        let generation = self.generation;
        let position = self.position_mut(id)?;

        ensure_idle(position, track)?;
        if track == Track::Standard && position.track_status(Track::Raiku) == PositionStatus::ScheduledAot {
            return Err(SimError::ConflictingAttempt(id));
        }

        let pending = match track {
            Track::Standard => PositionStatus::PendingStandard,
            Track::Raiku => PositionStatus::PendingRaiku,
        };
        position.set_track_status(track, pending);

        Ok(AttemptTicket {
            generation,
            position_id: id,
            track,
            kind: AttemptKind::Immediate,
        })
    }

    /// Pre-commit a guaranteed Raiku execution for an at-risk position
    pub fn submit_ahead_of_time(&mut self, id: u32) -> SimResult<AttemptTicket> {
        let class = self.classify(id)?;
        if class != RiskClass::AtRisk {
            return Err(SimError::NotEligible(id, class));
        }

        let generation = self.generation;
        let position = self.position_mut(id)?;

        ensure_idle(position, Track::Raiku)?;
        if position.track_status(Track::Standard).is_in_flight() {
            return Err(SimError::ConflictingAttempt(id));
        }
        position.set_track_status(Track::Raiku, PositionStatus::ScheduledAot);

        Ok(AttemptTicket {
            generation,
            position_id: id,
            track: Track::Raiku,
            kind: AttemptKind::AheadOfTime,
        })
    }

    /// Resolve a ticket with the configured failure rate for its track.
    /// Ahead-of-time tickets never fail.
    pub fn resolve(&mut self, ticket: AttemptTicket) -> SimResult<Option<AttemptReport>> {
        let fail_rate = match ticket.kind {
            AttemptKind::AheadOfTime => 0.0,
            AttemptKind::Immediate => self.config.fail_rate(ticket.track),
        };
        self.resolve_with_rate(ticket, fail_rate)
    }

    /// Draw once and apply the outcome. Returns `None` without touching any
    /// state when the ticket belongs to a previous generation or its track was
    /// missed while it was in flight.
    pub fn resolve_with_rate(
        &mut self,
        ticket: AttemptTicket,
        fail_rate: f64,
    ) -> SimResult<Option<AttemptReport>> {
        check_fail_rate(fail_rate)?;

        if ticket.generation != self.generation {
            debug!(
                "Discarding stale resolution for #{} on {} (generation {} != {})",
                ticket.position_id, ticket.track, ticket.generation, self.generation
            );
            return Ok(None);
        }

        let Some(position) = self.pool.iter().find(|p| p.id == ticket.position_id) else {
            return Ok(None);
        };

        match position.track_status(ticket.track) {
            PositionStatus::Missed => {
                debug!("#{} already settled, {} attempt missed", ticket.position_id, ticket.track);
                return Ok(None);
            }
            status if status.is_in_flight() => {}
            _ => return Err(SimError::AlreadyAttempted(ticket.position_id, ticket.track)),
        }

        let draw = self.rng.next_uniform();
        let outcome = Outcome::from_draw(draw, fail_rate);
        debug!(
            "Draw {:.4} vs fail rate {:.2} for #{} on {}: {:?}",
            draw, fail_rate, ticket.position_id, ticket.track, outcome
        );

        let position = self.position_mut(ticket.position_id)?;
        let profit = position.profit;
        let asset = position.asset.clone();
        let other = ticket.track.other();

        match outcome {
            Outcome::Success => {
                position.set_track_status(ticket.track, PositionStatus::ResolvedSuccess);
                let other_status = position.track_status(other);
                if other_status == PositionStatus::Idle || other_status.is_in_flight() {
                    position.set_track_status(other, PositionStatus::Missed);
                }
            }
            Outcome::Failure => {
                position.set_track_status(ticket.track, PositionStatus::ResolvedFailed);
                // A lost standard race means someone else took the position
                let other_status = position.track_status(other);
                if ticket.track == Track::Standard
                    && (other_status == PositionStatus::Idle || other_status.is_in_flight())
                {
                    position.set_track_status(other, PositionStatus::Missed);
                }
            }
        }

        let counters = self.counters.get_mut(ticket.track);
        counters.record(outcome, profit);

        let report = AttemptReport {
            generation: self.generation,
            position_id: ticket.position_id,
            asset,
            track: ticket.track,
            kind: ticket.kind,
            outcome,
            profit: if outcome.is_success() { profit } else { 0.0 },
            draw,
            counters: *counters,
            resolved_at: Utc::now(),
        };

        for observer in &mut self.observers {
            observer.on_attempt_resolved(&report);
        }

        Ok(Some(report))
    }

    /// Immediate attempt at the configured failure rate
    pub fn attempt(&mut self, id: u32, track: Track) -> SimResult<AttemptReport> {
        let fail_rate = self.config.fail_rate(track);
        self.attempt_with_rate(id, track, fail_rate)
    }

    pub fn attempt_with_rate(&mut self, id: u32, track: Track, fail_rate: f64) -> SimResult<AttemptReport> {
        check_fail_rate(fail_rate)?;
        let ticket = self.submit(id, track)?;
        self.resolve_with_rate(ticket, fail_rate)?
            .ok_or_else(|| SimError::Internal(format!("attempt on #{} resolved to nothing", id)))
    }

    /// Schedule and immediately settle an AoT execution
    pub fn schedule_ahead_of_time(&mut self, id: u32) -> SimResult<AttemptReport> {
        let ticket = self.submit_ahead_of_time(id)?;
        self.resolve(ticket)?
            .ok_or_else(|| SimError::Internal(format!("AoT on #{} resolved to nothing", id)))
    }

    /// Walk the pool most-vulnerable first, applying `policy` to vulnerable
    /// positions and AoT scheduling to at-risk ones when the policy uses Raiku.
    pub fn sweep(&mut self, policy: SweepPolicy) -> SimResult<SweepReport> {
        let before = self.counters;
        let mut report = SweepReport::new(policy);

        let targets: Vec<(u32, RiskClass)> = self
            .pool
            .iter()
            .map(|p| (p.id, classify(p, self.config.liq_threshold, self.config.aot_threshold)))
            .collect();

        for (id, class) in targets {
            match class {
                RiskClass::Vulnerable => {
                    report.eligible += 1;
                    for &track in policy.tracks() {
                        match self.attempt(id, track) {
                            Ok(attempt) if attempt.outcome.is_success() => break,
                            Ok(_) => {}
                            Err(e) if e.is_rejection() => break,
                            Err(e) => return Err(e),
                        }
                    }
                }
                RiskClass::AtRisk if policy.uses_aot() => {
                    report.eligible += 1;
                    match self.schedule_ahead_of_time(id) {
                        Ok(_) => {}
                        Err(e) if e.is_rejection() => {}
                        Err(e) => return Err(e),
                    }
                }
                RiskClass::AtRisk | RiskClass::Safe => {}
            }
        }

        for position in self.pool.iter() {
            let class = classify(position, self.config.liq_threshold, self.config.aot_threshold);
            if position.is_liquidated() {
                report.liquidated += 1;
                report.captured_profit += position.profit;
            } else if class != RiskClass::Safe {
                report.missed_profit += position.profit;
            }
        }

        for track in Track::all() {
            *report.counters.get_mut(track) = self.counters.get(track).since(before.get(track));
        }

        Ok(report)
    }

    fn position_mut(&mut self, id: u32) -> SimResult<&mut Position> {
        self.pool
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SimError::PositionNotFound(id))
    }
}

fn ensure_idle(position: &Position, track: Track) -> SimResult<()> {
    match position.track_status(track) {
        PositionStatus::Idle => Ok(()),
        PositionStatus::Missed => Err(SimError::TrackMissed(position.id, track)),
        _ => Err(SimError::AlreadyAttempted(position.id, track)),
    }
}

fn check_fail_rate(fail_rate: f64) -> SimResult<()> {
    if (0.0..=1.0).contains(&fail_rate) {
        Ok(())
    } else {
        Err(SimError::InvalidParameter(
            "fail_rate".to_string(),
            format!("{} is outside [0, 1]", fail_rate),
        ))
    }
}

/// Order in which tracks are tried against vulnerable positions during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepPolicy {
    StandardOnly,
    RaikuOnly,
    RaikuThenStandard, // Standard stays open after a Raiku failure
}

impl SweepPolicy {
    pub fn all() -> [SweepPolicy; 3] {
        [SweepPolicy::StandardOnly, SweepPolicy::RaikuOnly, SweepPolicy::RaikuThenStandard]
    }

    pub fn tracks(self) -> &'static [Track] {
        match self {
            SweepPolicy::StandardOnly => &[Track::Standard],
            SweepPolicy::RaikuOnly => &[Track::Raiku],
            SweepPolicy::RaikuThenStandard => &[Track::Raiku, Track::Standard],
        }
    }

    pub fn uses_aot(self) -> bool {
        self.tracks().contains(&Track::Raiku)
    }

    pub fn name(self) -> &'static str {
        match self {
            SweepPolicy::StandardOnly => "standard-only",
            SweepPolicy::RaikuOnly => "raiku-only",
            SweepPolicy::RaikuThenStandard => "raiku-then-standard",
        }
    }
}

impl fmt::Display for SweepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SweepPolicy::all()
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                SimError::InvalidParameter(
                    "policy".to_string(),
                    format!("'{}' (expected standard-only, raiku-only or raiku-then-standard)", s),
                )
            })
    }
}

/// Outcome of one sweep over the pool. `counters` holds only the attempts
/// made during the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub policy: SweepPolicy,
    pub eligible: usize,
    pub liquidated: usize,
    pub captured_profit: f64,
    pub missed_profit: f64,
    pub counters: TrackCounters,
}

impl SweepReport {
    fn new(policy: SweepPolicy) -> Self {
        Self {
            policy,
            eligible: 0,
            liquidated: 0,
            captured_profit: 0.0,
            missed_profit: 0.0,
            counters: TrackCounters::default(),
        }
    }

    pub fn capture_rate(&self) -> f64 {
        let total = self.captured_profit + self.missed_profit;
        if total <= 0.0 {
            0.0
        } else {
            self.captured_profit / total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::ScriptedSource;

    fn simulator_with(draws: Vec<f64>) -> LiquidationSimulator {
        let mut sim = LiquidationSimulator::new(
            SimulationConfig::default(),
            Box::new(ScriptedSource::new(draws)),
        );
        sim.pool = vec![
            Position::new(1, "SOL", 1.00, 20.0),
            Position::new(2, "RAY", 1.10, 30.0),
            Position::new(3, "BONK", 1.22, 40.0),
        ];
        sim.generation = 1;
        sim
    }

    #[test]
    fn test_success_misses_other_track() {
        let mut sim = simulator_with(vec![0.9]);
        let report = sim.attempt(1, Track::Standard).unwrap();

        assert_eq!(report.outcome, Outcome::Success);
        let position = sim.position(1).unwrap();
        assert_eq!(position.track_status(Track::Standard), PositionStatus::ResolvedSuccess);
        assert_eq!(position.track_status(Track::Raiku), PositionStatus::Missed);
        assert_eq!(sim.attempt(1, Track::Raiku), Err(SimError::TrackMissed(1, Track::Raiku)));
    }

    #[test]
    fn test_standard_failure_closes_raiku() {
        let mut sim = simulator_with(vec![0.1]);
        let report = sim.attempt(1, Track::Standard).unwrap();

        assert_eq!(report.outcome, Outcome::Failure);
        assert_eq!(sim.position(1).unwrap().track_status(Track::Raiku), PositionStatus::Missed);
    }

    #[test]
    fn test_standard_failure_drops_pending_raiku() {
        let mut sim = simulator_with(vec![0.1, 0.9]);
        let standard = sim.submit(2, Track::Standard).unwrap();
        let raiku = sim.submit(2, Track::Raiku).unwrap();

        let failed = sim.resolve(standard).unwrap().unwrap();
        assert_eq!(failed.outcome, Outcome::Failure);
        assert_eq!(sim.position(2).unwrap().track_status(Track::Raiku), PositionStatus::Missed);

        assert!(sim.resolve(raiku).unwrap().is_none());
        assert_eq!(sim.track_counters(Track::Raiku).attempts(), 0);
        assert_eq!(sim.track_counters(Track::Raiku).total_profit(), 0.0);
        assert_eq!(sim.position(2).unwrap().status(), PositionStatus::ResolvedFailed);
    }

    #[test]
    fn test_raiku_failure_keeps_standard_open() {
        let mut sim = simulator_with(vec![0.3, 0.9]);
        let failed = sim.attempt_with_rate(1, Track::Raiku, 0.5).unwrap();
        assert_eq!(failed.outcome, Outcome::Failure);
        assert_eq!(sim.position(1).unwrap().track_status(Track::Standard), PositionStatus::Idle);

        let won = sim.attempt(1, Track::Standard).unwrap();
        assert_eq!(won.outcome, Outcome::Success);
        assert_eq!(sim.position(1).unwrap().status(), PositionStatus::ResolvedSuccess);
    }

    #[test]
    fn test_no_retry_on_same_track() {
        let mut sim = simulator_with(vec![0.1]);
        sim.attempt_with_rate(1, Track::Raiku, 0.5).unwrap();
        assert_eq!(
            sim.attempt(1, Track::Raiku),
            Err(SimError::AlreadyAttempted(1, Track::Raiku))
        );
        assert_eq!(sim.track_counters(Track::Raiku).attempts(), 1);
    }

    #[test]
    fn test_pending_loser_resolves_to_nothing() {
        let mut sim = simulator_with(vec![0.99, 0.99]);
        let standard = sim.submit(1, Track::Standard).unwrap();
        let raiku = sim.submit(1, Track::Raiku).unwrap();

        assert!(sim.resolve(raiku).unwrap().is_some());
        assert_eq!(sim.position(1).unwrap().track_status(Track::Standard), PositionStatus::Missed);
        assert!(sim.resolve(standard).unwrap().is_none());

        let standard_counters = sim.track_counters(Track::Standard);
        assert_eq!(standard_counters.attempts(), 0);
    }

    #[test]
    fn test_aot_only_for_at_risk() {
        let mut sim = simulator_with(vec![]);
        assert_eq!(
            sim.schedule_ahead_of_time(1),
            Err(SimError::NotEligible(1, RiskClass::Vulnerable))
        );
        assert_eq!(
            sim.schedule_ahead_of_time(3),
            Err(SimError::NotEligible(3, RiskClass::Safe))
        );

        let report = sim.schedule_ahead_of_time(2).unwrap();
        assert_eq!(report.kind, AttemptKind::AheadOfTime);
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(sim.track_counters(Track::Raiku).total_profit(), 30.0);
    }

    #[test]
    fn test_standard_blocked_while_aot_scheduled() {
        let mut sim = simulator_with(vec![]);
        let _ticket = sim.submit_ahead_of_time(2).unwrap();
        assert_eq!(sim.submit(2, Track::Standard), Err(SimError::ConflictingAttempt(2)));
        assert_eq!(sim.position(2).unwrap().status(), PositionStatus::ScheduledAot);
    }

    #[test]
    fn test_invalid_rate_leaves_position_idle() {
        let mut sim = simulator_with(vec![]);
        assert!(matches!(
            sim.attempt_with_rate(1, Track::Standard, 1.5),
            Err(SimError::InvalidParameter(_, _))
        ));
        assert_eq!(sim.position(1).unwrap().status(), PositionStatus::Idle);
    }

    #[test]
    fn test_sweep_policy_parse() {
        assert_eq!("raiku-only".parse::<SweepPolicy>().unwrap(), SweepPolicy::RaikuOnly);
        assert!("fastest".parse::<SweepPolicy>().is_err());
        assert!(!SweepPolicy::StandardOnly.uses_aot());
    }

    #[test]
    fn test_sweep_raiku_captures_everything_eligible() {
        let mut sim = simulator_with(vec![]);
        let report = sim.sweep(SweepPolicy::RaikuOnly).unwrap();

        assert_eq!(report.eligible, 2);
        assert_eq!(report.liquidated, 2);
        assert_eq!(report.captured_profit, 50.0);
        assert_eq!(report.missed_profit, 0.0);
        assert_eq!(report.counters.raiku.successes(), 2);
    }

    #[test]
    fn test_sweep_standard_only_skips_at_risk() {
        let mut sim = simulator_with(vec![0.1]);
        let report = sim.sweep(SweepPolicy::StandardOnly).unwrap();

        assert_eq!(report.eligible, 1);
        assert_eq!(report.liquidated, 0);
        assert_eq!(report.missed_profit, 50.0);
        assert_eq!(report.counters.standard.failures(), 1);
    }
}
