// Race and batch command implementations
use tracing::info;
use raiku_race_sim::feedback::{round_message, text_bars};
use raiku_race_sim::{
    clamp_rounds, run_batch, BatchProgress, Config, RaceDashboard, RaceProgress, SimResult,
};

pub async fn run_race(config: &Config, seed: Option<u64>, rounds: &str, json: bool) -> SimResult<()> {
    let rounds = clamp_rounds(rounds);
    let dashboard = match seed {
        Some(seed) => RaceDashboard::with_seed(config.simulation.clone(), config.timing.clone(), seed),
        None => RaceDashboard::with_entropy(config.simulation.clone(), config.timing.clone()),
    };

    let progress = if json { RaceProgress::hidden() } else { RaceProgress::new(rounds) };
    let summary = dashboard.run(rounds, &progress).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for result in &summary.history {
        info!("  {}", round_message(result, config.simulation.race_profit));
    }

    let bars = text_bars(&[summary.standard.total_profit(), summary.raiku.total_profit()], 40);
    info!("📊 Race Summary ({} rounds)", summary.rounds);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        "  Standard {:>5.1}% | ${:>8.2} {}",
        summary.standard_success_rate * 100.0,
        summary.standard.total_profit(),
        bars[0]
    );
    info!(
        "  Raiku    {:>5.1}% | ${:>8.2} {}",
        summary.raiku_success_rate * 100.0,
        summary.raiku.total_profit(),
        bars[1]
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("💰 Raiku advantage: ${:.2}", summary.raiku_advantage);
    Ok(())
}

pub fn run_batch_command(config: &Config, seed: Option<u64>, trials: usize, json: bool) -> SimResult<()> {
    let seed = seed.unwrap_or_else(rand::random);
    let progress = if json {
        BatchProgress::hidden()
    } else {
        BatchProgress::new(trials * 3)
    };

    let report = run_batch(&config.simulation, trials, seed, &progress)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    info!("🎲 Monte Carlo: {} trials per policy, seed {}", report.trials, report.seed);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for agg in &report.policies {
        info!(
            "  {:<20} captured ${:>7.2} (max ${:>7.2}) | missed ${:>7.2} | capture {:>5.1}% | hit rate {:>5.1}%",
            agg.policy.name(),
            agg.avg_captured_profit,
            agg.max_captured_profit,
            agg.avg_missed_profit,
            agg.avg_capture_rate * 100.0,
            agg.attempt_success_rate * 100.0
        );
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if let Some(best) = report.best_policy() {
        info!("🏆 Best policy: {}", best.policy);
    }
    Ok(())
}
