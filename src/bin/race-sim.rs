// Raiku Liquidation Race Simulator - CLI
// Single entry point for pool inspection, liquidation sweeps, paired races and batch runs

use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Level};
use raiku_race_sim::{Config, SimError, SimResult, SweepPolicy, Track};

// Load command modules from cli directory
#[path = "../cli/pool_commands.rs"]
mod pool_commands;
#[path = "../cli/race_commands.rs"]
mod race_commands;

#[derive(Parser)]
#[command(name = "race-sim")]
#[command(version = "0.2.0")]
#[command(about = "Standard vs Raiku liquidation race simulator", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    /// Seed the random source for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a pool and show each position's risk class
    Pool,

    /// Liquidate positions in a fresh pool
    Liquidate {
        /// Only this position id (otherwise sweep the whole pool)
        #[arg(short, long)]
        position: Option<u32>,

        /// Track for a single position: standard or raiku
        #[arg(short, long)]
        track: Option<String>,

        /// Sweep policy: standard-only, raiku-only, raiku-then-standard
        #[arg(long, default_value = "raiku-then-standard")]
        policy: String,
    },

    /// Paired dashboard race, both tracks every round
    Race {
        /// Number of rounds (clamped to 1-100)
        #[arg(short, long, default_value = "10")]
        rounds: String,
    },

    /// Monte Carlo comparison of sweep policies
    Batch {
        /// Trials per policy
        #[arg(short, long, default_value = "1000")]
        trials: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("❌ {} error", e.category());
        for line in e.user_message().lines() {
            error!("{}", line);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> SimResult<()> {
    // Init writes the config, so it runs before any config is loaded
    if let Commands::Init { force } = cli.command {
        init_logging(cli.verbose, "info");
        return init_config(&cli.config, force);
    }

    // Logging comes up before config errors are reported
    let config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, "info");
            return Err(e.into());
        }
    };
    init_logging(cli.verbose, &config.logging.log_level);

    info!("🚀 Raiku Race Simulator v0.2.0");
    info!("📁 Config: {}", cli.config);
    if let Some(seed) = cli.seed {
        info!("🎲 Seed: {}", seed);
    }

    match cli.command {
        Commands::Init { .. } => Ok(()),

        Commands::Pool => pool_commands::show_pool(&config, cli.seed, cli.json),

        Commands::Liquidate { position, track, policy } => {
            let track = track.as_deref().map(parse_track).transpose()?;
            match position {
                Some(id) => pool_commands::liquidate_one(&config, cli.seed, id, track, cli.json).await,
                None => {
                    if track.is_some() {
                        warn!("⚠️  --track only applies with --position; sweeping by policy");
                    }
                    let policy: SweepPolicy = policy.parse()?;
                    pool_commands::liquidate_pool(&config, cli.seed, policy, cli.json).await
                }
            }
        }

        Commands::Race { rounds } => race_commands::run_race(&config, cli.seed, &rounds, cli.json).await,

        Commands::Batch { trials } => race_commands::run_batch_command(&config, cli.seed, trials, cli.json),
    }
}

fn init_logging(verbose: bool, level: &str) {
    let level = if verbose {
        Level::DEBUG
    } else {
        level.parse().unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn init_config(path: &str, force: bool) -> SimResult<()> {
    if std::path::Path::new(path).exists() && !force {
        warn!("⚠️  {} already exists, skipping (use --force to overwrite)", path);
        return Ok(());
    }

    let default_config = include_str!("../../config.toml.example");
    std::fs::write(path, default_config).map_err(|e| SimError::FileWrite(e.to_string()))?;
    info!("📝 Created {}", path);
    info!("💡 Next steps:");
    info!("   1. Tune failure rates and thresholds in {}", path);
    info!("   2. Run: race-sim pool");
    info!("   3. Run: race-sim race --rounds 25");
    Ok(())
}

fn parse_track(name: &str) -> SimResult<Track> {
    match name.to_ascii_lowercase().as_str() {
        "standard" => Ok(Track::Standard),
        "raiku" => Ok(Track::Raiku),
        other => Err(SimError::InvalidParameter(
            "track".to_string(),
            format!("'{}' (expected standard or raiku)", other),
        )),
    }
}
