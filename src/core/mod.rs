// Core simulator modules

pub mod types;
pub mod random;
pub mod pool;
pub mod events;
pub mod simulator;

// Re-export commonly used types
pub use types::{
    Action, AttemptKind, AttemptReport, Outcome, Position, PositionStatus, RaceCounters, RiskClass,
    Track, TrackCounters,
};
pub use random::{RandomSource, RngSource, ScriptedSource};
pub use pool::{classify, classify_health, generate_pool};
pub use events::{RecordingObserver, SimEvent, SimulatorObserver, TracingObserver};
pub use simulator::{AttemptTicket, LiquidationSimulator, SweepPolicy, SweepReport};
