// Simulator callbacks consumed by a presentation layer

use crate::core::types::{AttemptReport, Outcome, Position};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Receives simulator lifecycle notifications. All methods default to no-ops.
pub trait SimulatorObserver: Send {
    fn on_pool_generated(&mut self, _generation: u64, _positions: &[Position]) {}

    fn on_attempt_resolved(&mut self, _report: &AttemptReport) {}

    fn on_reset(&mut self, _generation: u64) {}
}

/// Owned copy of a callback, for recording and JSON export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    PoolGenerated { generation: u64, positions: Vec<Position> },
    AttemptResolved(AttemptReport),
    Reset { generation: u64 },
}

/// Logs every callback through tracing
#[derive(Debug, Default)]
pub struct TracingObserver;

impl SimulatorObserver for TracingObserver {
    fn on_pool_generated(&mut self, generation: u64, positions: &[Position]) {
        info!("🧮 Pool #{} generated: {} positions", generation, positions.len());
        for p in positions {
            debug!("   #{:<3} {:<5} health {:.3} profit ${:.2}", p.id, p.asset, p.health, p.profit);
        }
    }

    fn on_attempt_resolved(&mut self, report: &AttemptReport) {
        let icon = match report.outcome {
            Outcome::Success => "🟢",
            Outcome::Failure => "🔴",
        };
        info!(
            "{} {} #{} ({}) {:?} | attempts {} successes {} profit ${:.2}",
            icon,
            report.track,
            report.position_id,
            report.asset,
            report.outcome,
            report.counters.attempts(),
            report.counters.successes(),
            report.counters.total_profit()
        );
    }

    fn on_reset(&mut self, generation: u64) {
        info!("🔄 Simulator reset, generation {}", generation);
    }
}

/// Collects events into a shared buffer
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<SimEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<SimEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn resolved(&self) -> Vec<AttemptReport> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SimEvent::AttemptResolved(report) => Some(report),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SimEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl SimulatorObserver for RecordingObserver {
    fn on_pool_generated(&mut self, generation: u64, positions: &[Position]) {
        self.push(SimEvent::PoolGenerated {
            generation,
            positions: positions.to_vec(),
        });
    }

    fn on_attempt_resolved(&mut self, report: &AttemptReport) {
        self.push(SimEvent::AttemptResolved(report.clone()));
    }

    fn on_reset(&mut self, generation: u64) {
        self.push(SimEvent::Reset { generation });
    }
}
