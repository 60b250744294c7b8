// Pool command implementations
use tracing::{info, warn};
use raiku_race_sim::feedback::{attempt_message, rejection_message};
use raiku_race_sim::{
    classify, Action, Config, LiquidationSimulator, RiskClass, SimResult, SimulationRunner, Spinner,
    SweepPolicy, TracingObserver, Track,
};

pub fn build_simulator(config: &Config, seed: Option<u64>) -> LiquidationSimulator {
    let mut simulator = match seed {
        Some(seed) => LiquidationSimulator::with_seed(config.simulation.clone(), seed),
        None => LiquidationSimulator::with_entropy(config.simulation.clone()),
    };
    if config.logging.log_events {
        simulator.add_observer(Box::new(TracingObserver));
    }
    simulator
}

pub fn show_pool(config: &Config, seed: Option<u64>, json: bool) -> SimResult<()> {
    let mut simulator = build_simulator(config, seed);
    let pool = simulator.restart()?.to_vec();

    if json {
        println!("{}", serde_json::to_string_pretty(&pool)?);
        return Ok(());
    }

    let sim = &config.simulation;
    info!("📋 Liquidation Pool ({} positions)", pool.len());
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for position in &pool {
        let class = classify(position, sim.liq_threshold, sim.aot_threshold);
        let icon = match class {
            RiskClass::Vulnerable => "🔴",
            RiskClass::AtRisk => "🟡",
            RiskClass::Safe => "🟢",
        };
        info!(
            "  {} #{:<3} {:<5} health {:.3}  profit ${:>6.2}  {}",
            icon,
            position.id,
            position.asset,
            position.health,
            position.profit,
            class.label()
        );
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    Ok(())
}

/// Liquidate a single position on one track, with the configured delay
pub async fn liquidate_one(
    config: &Config,
    seed: Option<u64>,
    id: u32,
    track: Option<Track>,
    json: bool,
) -> SimResult<()> {
    let runner = SimulationRunner::new(build_simulator(config, seed), config.timing.clone());
    runner.restart()?;

    let class = runner.with_simulator(|sim| sim.classify(id))??;
    let action = match (class, track) {
        (RiskClass::AtRisk, None | Some(Track::Raiku)) => Action::ScheduleAheadOfTime,
        (_, Some(track)) => Action::Liquidate(track),
        (_, None) => Action::Liquidate(Track::Raiku),
    };

    if !class.actions().contains(&action) {
        warn!("⚠️  #{} is {}: {:?} is not offered", id, class.label(), action);
        return Ok(());
    }

    let pending = match action {
        Action::ScheduleAheadOfTime => runner.spawn_ahead_of_time(id),
        Action::Liquidate(track) => runner.spawn_attempt(id, track),
    };

    let pending = match pending {
        Ok(pending) => pending,
        Err(e) if e.is_rejection() => {
            warn!("⚠️  {}", rejection_message(&e));
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let spinner = Spinner::new(&format!("Submitting #{}...", id));
    let report = raiku_race_sim::await_attempt(pending).await?;
    spinner.finish("Resolved");

    match report {
        Some(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
        Some(report) => info!("{}", attempt_message(&report)),
        None => warn!("⚠️  Attempt on #{} was discarded", id),
    }
    Ok(())
}

/// Put every eligible position in flight under `policy` and report the result
pub async fn liquidate_pool(
    config: &Config,
    seed: Option<u64>,
    policy: SweepPolicy,
    json: bool,
) -> SimResult<()> {
    let runner = SimulationRunner::new(build_simulator(config, seed), config.timing.clone());
    runner.restart()?;

    let spinner = Spinner::new(&format!("Racing the pool ({})...", policy));
    let reports = runner.sweep(policy).await?;
    spinner.finish(&format!("{} attempts resolved", reports.len()));

    let counters = runner.with_simulator(|sim| *sim.counters())?;

    if json {
        let output = serde_json::json!({
            "policy": policy,
            "attempts": reports,
            "counters": counters,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for report in &reports {
        info!("  {}", attempt_message(report));
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for track in Track::all() {
        let c = counters.get(track);
        info!(
            "  {:<8} attempts {:>3} | successes {:>3} | failures {:>3} | profit ${:.2}",
            track.name(),
            c.attempts(),
            c.successes(),
            c.failures(),
            c.total_profit()
        );
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    Ok(())
}
