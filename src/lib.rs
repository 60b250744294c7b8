// Raiku Liquidation Race Simulator
//
// Synthetic lending positions raced between a contested standard execution
// path and a guaranteed Raiku path, with AoT scheduling for at-risk positions

pub mod core;
pub mod config;
pub mod error;       // Unified error handling
pub mod feedback;    // Informational outcome messages
pub mod progress;
pub mod simulation;

// Re-export core simulator types
pub use core::{
    classify, generate_pool, Action, AttemptKind, AttemptReport, AttemptTicket, LiquidationSimulator,
    Outcome, Position, PositionStatus, RaceCounters, RandomSource, RecordingObserver, RiskClass,
    RngSource, ScriptedSource, SimEvent, SimulatorObserver, SweepPolicy, SweepReport, Track,
    TrackCounters, TracingObserver,
};

// Re-export error types
pub use error::{SimError, SimResult};

// Re-export configuration
pub use config::{Config, ConfigError, LoggingConfig, SimulationConfig, TimingConfig};

// Re-export progress helpers
pub use progress::{BatchProgress, RaceProgress, Spinner};

// Re-export simulation drivers
pub use simulation::{
    await_attempt, chart_scale, clamp_rounds, run_batch, BatchReport, PendingAttempt, PolicyAggregate,
    RaceDashboard, RaceSummary, RoundResult, SimulationRunner,
};
