//! Progress bar utilities for long-running simulations
//!
//! Provides visual feedback during paired races, batch runs and pool sweeps
//! using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Progress bar for paired race rounds
pub struct RaceProgress {
    pub progress: ProgressBar,
}

impl RaceProgress {
    /// Create a new race progress bar
    pub fn new(rounds: u32) -> Self {
        let progress = ProgressBar::new(rounds as u64);
        progress.set_style(bar_style(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] round {pos}/{len}\n{msg}",
        ));
        Self { progress }
    }

    /// Progress bar that draws nothing (JSON output, tests)
    pub fn hidden() -> Self {
        Self {
            progress: ProgressBar::hidden(),
        }
    }

    /// Advance one round and show the running profit of both tracks
    pub fn round_done(&self, standard_profit: f64, raiku_profit: f64) {
        self.progress.inc(1);
        self.progress.set_message(format!(
            "⚔️  Standard ${:.2} | Raiku ${:.2}",
            standard_profit, raiku_profit
        ));
    }

    pub fn finish(&self, rounds: usize) {
        self.progress
            .finish_with_message(format!("✅ Race complete! {} rounds", rounds));
    }

    pub fn abandon(&self, reason: &str) {
        self.progress.abandon_with_message(format!("⚠️  {}", reason));
    }
}

/// Progress bar for Monte Carlo trials. Safe to advance from rayon workers.
pub struct BatchProgress {
    pub progress: ProgressBar,
}

impl BatchProgress {
    pub fn new(total_trials: usize) -> Self {
        let progress = ProgressBar::new(total_trials as u64);
        progress.set_style(bar_style(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} trials ({eta})",
        ));
        Self { progress }
    }

    pub fn hidden() -> Self {
        Self {
            progress: ProgressBar::hidden(),
        }
    }

    pub fn trial_done(&self) {
        self.progress.inc(1);
    }

    pub fn finish(&self) {
        self.progress.finish_with_message("✅ Batch complete");
    }
}

/// Spinner while attempts are in flight
pub struct Spinner {
    pub spinner: ProgressBar,
}

impl Spinner {
    /// Create a new spinner
    pub fn new(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(message.to_string());

        Self { spinner }
    }

    /// Update spinner message
    pub fn update(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    /// Finish spinner with success
    pub fn finish(&self, message: &str) {
        self.spinner.finish_with_message(format!("✅ {}", message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_progress() {
        let progress = RaceProgress::hidden();
        progress.round_done(12.5, 12.5);
        progress.round_done(12.5, 25.0);
        assert_eq!(progress.progress.position(), 2);
        progress.finish(2);
    }

    #[test]
    fn test_batch_progress_from_threads() {
        let progress = BatchProgress::hidden();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| progress.trial_done());
            }
        });
        assert_eq!(progress.progress.position(), 4);
    }

    #[test]
    fn test_spinner() {
        let spinner = Spinner::new("Resolving...");
        spinner.update("Still resolving...");
        spinner.finish("Resolved");
    }
}
