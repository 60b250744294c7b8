// Common types used across the simulator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution path a liquidation is submitted through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Standard, // Contested public mempool execution
    Raiku,    // Guaranteed slot execution
}

impl Track {
    pub fn all() -> [Track; 2] {
        [Track::Standard, Track::Raiku]
    }

    pub fn other(self) -> Track {
        match self {
            Track::Standard => Track::Raiku,
            Track::Raiku => Track::Standard,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Track::Standard => "Standard",
            Track::Raiku => "Raiku",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// A draw `r` succeeds only when it lands strictly above the failure rate
    pub fn from_draw(draw: f64, fail_rate: f64) -> Self {
        if draw > fail_rate {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Liquidation eligibility derived from the health factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskClass {
    Vulnerable, // health <= liquidation threshold
    AtRisk,     // between the two thresholds, AoT only
    Safe,
}

/// Action a presentation layer offers for a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Liquidate(Track),
    ScheduleAheadOfTime,
}

impl RiskClass {
    /// Buttons offered per class. Standard is withheld from at-risk positions
    /// since it is too early to race them.
    pub fn actions(self) -> &'static [Action] {
        match self {
            RiskClass::Vulnerable => &[
                Action::Liquidate(Track::Standard),
                Action::Liquidate(Track::Raiku),
            ],
            RiskClass::AtRisk => &[Action::ScheduleAheadOfTime],
            RiskClass::Safe => &[],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskClass::Vulnerable => "VULNERABLE",
            RiskClass::AtRisk => "AT RISK",
            RiskClass::Safe => "SAFE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Idle,
    PendingStandard,
    PendingRaiku,
    ScheduledAot,
    ResolvedSuccess,
    ResolvedFailed,
    Missed,
}

impl PositionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PositionStatus::ResolvedSuccess | PositionStatus::ResolvedFailed | PositionStatus::Missed
        )
    }

    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            PositionStatus::PendingStandard | PositionStatus::PendingRaiku | PositionStatus::ScheduledAot
        )
    }
}

/// Synthetic lending position. Identity, asset and profit are fixed at
/// creation; only the per-track statuses evolve until the next reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: u32,
    pub asset: String,
    pub health: f64,
    pub profit: f64,
    standard: PositionStatus,
    raiku: PositionStatus,
}

impl Position {
    pub fn new(id: u32, asset: impl Into<String>, health: f64, profit: f64) -> Self {
        Self {
            id,
            asset: asset.into(),
            health,
            profit,
            standard: PositionStatus::Idle,
            raiku: PositionStatus::Idle,
        }
    }

    pub fn track_status(&self, track: Track) -> PositionStatus {
        match track {
            Track::Standard => self.standard,
            Track::Raiku => self.raiku,
        }
    }

    pub(crate) fn set_track_status(&mut self, track: Track, status: PositionStatus) {
        match track {
            Track::Standard => self.standard = status,
            Track::Raiku => self.raiku = status,
        }
    }

    /// Overall status as shown on the position card
    pub fn status(&self) -> PositionStatus {
        let both = [self.standard, self.raiku];

        if both.contains(&PositionStatus::ResolvedSuccess) {
            return PositionStatus::ResolvedSuccess;
        }
        if let Some(in_flight) = both.iter().copied().find(|s| s.is_in_flight()) {
            return in_flight;
        }
        if both.contains(&PositionStatus::ResolvedFailed) {
            return PositionStatus::ResolvedFailed;
        }
        if both.contains(&PositionStatus::Missed) {
            return PositionStatus::Missed;
        }
        PositionStatus::Idle
    }

    pub fn is_liquidated(&self) -> bool {
        self.status() == PositionStatus::ResolvedSuccess
    }
}

/// Cumulative per-track counters. `attempts == successes + failures` always.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceCounters {
    attempts: u64,
    successes: u64,
    failures: u64,
    total_profit: f64,
}

impl RaceCounters {
    pub fn record(&mut self, outcome: Outcome, profit: f64) {
        self.attempts += 1;
        match outcome {
            Outcome::Success => {
                self.successes += 1;
                self.total_profit += profit;
            }
            Outcome::Failure => self.failures += 1,
        }
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn total_profit(&self) -> f64 {
        self.total_profit
    }

    /// Counts accumulated after `earlier` was taken
    pub fn since(&self, earlier: &RaceCounters) -> RaceCounters {
        RaceCounters {
            attempts: self.attempts.saturating_sub(earlier.attempts),
            successes: self.successes.saturating_sub(earlier.successes),
            failures: self.failures.saturating_sub(earlier.failures),
            total_profit: (self.total_profit - earlier.total_profit).max(0.0),
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }
}

/// Counters for both tracks, indexed by `Track`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackCounters {
    pub standard: RaceCounters,
    pub raiku: RaceCounters,
}

impl TrackCounters {
    pub fn get(&self, track: Track) -> &RaceCounters {
        match track {
            Track::Standard => &self.standard,
            Track::Raiku => &self.raiku,
        }
    }

    pub(crate) fn get_mut(&mut self, track: Track) -> &mut RaceCounters {
        match track {
            Track::Standard => &mut self.standard,
            Track::Raiku => &mut self.raiku,
        }
    }
}

/// How an attempt was submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptKind {
    Immediate,
    AheadOfTime,
}

/// Result of one resolved attempt, handed to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReport {
    pub generation: u64,
    pub position_id: u32,
    pub asset: String,
    pub track: Track,
    pub kind: AttemptKind,
    pub outcome: Outcome,
    pub profit: f64,
    pub draw: f64,
    pub counters: RaceCounters,
    pub resolved_at: DateTime<Utc>,
}
