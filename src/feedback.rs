// User-facing messages for resolved and rejected attempts.
// Every simulated failure is reported as information, never as an error.

use crate::core::types::{AttemptKind, AttemptReport, Outcome, Track};
use crate::error::SimError;
use crate::simulation::race::{chart_scale, RoundResult};

pub fn attempt_message(report: &AttemptReport) -> String {
    match (report.track, report.kind, report.outcome) {
        (Track::Raiku, AttemptKind::AheadOfTime, _) => format!(
            "SCHEDULED! Raiku AoT executed #{} ({}) Profit ${:.2}",
            report.position_id, report.asset, report.profit
        ),
        (Track::Raiku, AttemptKind::Immediate, Outcome::Success) => {
            format!("SUCCESS! Raiku JIT Profit ${:.2}", report.profit)
        }
        (Track::Standard, _, Outcome::Success) => {
            format!("SUCCESS! Standard won the race. Profit ${:.2}", report.profit)
        }
        (Track::Standard, _, Outcome::Failure) => format!(
            "FAILED! Standard transaction for #{} lost the race. Position is gone.",
            report.position_id
        ),
        (Track::Raiku, _, Outcome::Failure) => format!(
            "FAILED! Raiku execution for #{} did not land. Standard can still try.",
            report.position_id
        ),
    }
}

/// Friendly text for operations the simulator refused
pub fn rejection_message(err: &SimError) -> String {
    match err {
        SimError::TrackMissed(id, _) => format!("MISSED: #{} was already settled", id),
        SimError::AlreadyAttempted(id, track) => {
            format!("#{} already used its {} attempt this round", id, track)
        }
        SimError::ConflictingAttempt(id) => {
            format!("#{} is already committed to an AoT execution", id)
        }
        SimError::NotEligible(id, class) => {
            format!("#{} is {}: nothing to liquidate yet", id, class.label())
        }
        other => other.to_string(),
    }
}

pub fn round_message(result: &RoundResult, profit: f64) -> String {
    let describe = |outcome: Outcome| match outcome {
        Outcome::Success => format!("won ${:.2}", profit),
        Outcome::Failure => "lost".to_string(),
    };
    format!(
        "Round {:>3}: Standard {} | Raiku {}",
        result.round,
        describe(result.standard),
        describe(result.raiku)
    )
}

/// Horizontal text bars, one per value, scaled against the largest value
pub fn text_bars(values: &[f64], width: usize) -> Vec<String> {
    chart_scale(values, width as f64)
        .into_iter()
        .map(|len| "█".repeat(len.round() as usize))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RaceCounters;
    use chrono::Utc;

    fn report(track: Track, kind: AttemptKind, outcome: Outcome) -> AttemptReport {
        AttemptReport {
            generation: 1,
            position_id: 3,
            asset: "SOL".to_string(),
            track,
            kind,
            outcome,
            profit: if outcome.is_success() { 19.46 } else { 0.0 },
            draw: 0.5,
            counters: RaceCounters::default(),
            resolved_at: Utc::now(),
        }
    }

    #[test]
    fn test_raiku_success_message() {
        let msg = attempt_message(&report(Track::Raiku, AttemptKind::Immediate, Outcome::Success));
        assert_eq!(msg, "SUCCESS! Raiku JIT Profit $19.46");
    }

    #[test]
    fn test_standard_failure_message() {
        let msg = attempt_message(&report(Track::Standard, AttemptKind::Immediate, Outcome::Failure));
        assert!(msg.starts_with("FAILED!"));
        assert!(msg.contains("#3"));
    }

    #[test]
    fn test_text_bars() {
        let bars = text_bars(&[0.0, 0.0], 10);
        assert!(bars.iter().all(|b| b.is_empty()));

        let bars = text_bars(&[25.0, 50.0], 10);
        assert_eq!(bars[0].chars().count(), 5);
        assert_eq!(bars[1].chars().count(), 10);
    }
}
