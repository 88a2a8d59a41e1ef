//! fleetscaled — the FleetScale daemon.
//!
//! Assembles the control loop: loads the run configuration, builds the
//! demand source (local simulator or remote HTTP provider), and drives
//! episodes with a built-in proportional policy as the stand-in policy
//! provider. An external RL optimizer replaces that policy by calling
//! the `fleetscale-env` API directly.
//!
//! # Usage
//!
//! ```text
//! fleetscaled run --config fleetscale.toml
//! fleetscaled run --signal-url local --episodes 3
//! fleetscaled scaffold > fleetscale.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use fleetscale_core::RunConfig;
use fleetscale_env::EpisodeController;
use fleetscale_signal::DemandSource;
use fleetscale_telemetry::LogSink;

#[derive(Parser)]
#[command(name = "fleetscaled", about = "FleetScale capacity-control daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control loop until stopped (Ctrl-C) or the episode
    /// budget is spent.
    Run {
        /// Path to a fleetscale.toml run configuration.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the demand source ("local" or a provider URL).
        #[arg(long)]
        signal_url: Option<String>,

        /// Number of episodes to run; 0 means run until stopped.
        #[arg(long, default_value = "0")]
        episodes: u64,
    },

    /// Print a starter fleetscale.toml to stdout.
    Scaffold,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fleetscaled=debug,fleetscale=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            signal_url,
            episodes,
        } => {
            let mut run_config = match config {
                Some(path) => RunConfig::from_file(&path)?,
                None => RunConfig::default(),
            };
            if let Some(url) = signal_url {
                run_config.gs_inventory_url = url;
            }
            run_config.validate()?;
            run(run_config, episodes).await
        }
        Command::Scaffold => {
            print!("{}", RunConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

async fn run(config: RunConfig, episode_budget: u64) -> anyhow::Result<()> {
    info!(
        signal = %config.gs_inventory_url,
        cadence_secs = config.learning_freq_secs,
        episode_secs = config.episode_duration_secs,
        min_servers = config.min_servers,
        max_servers = config.max_servers,
        "fleetscale daemon starting"
    );

    let source = DemandSource::from_config(&config);
    let sink = Arc::new(LogSink);
    let action_factor = config.action_factor;
    let mut controller = EpisodeController::new(config, source, sink);

    // Shutdown between ticks on Ctrl-C.
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut episode: u64 = 0;
    'episodes: loop {
        episode += 1;
        controller.reset();
        info!(episode, "episode started");

        // Stand-in policy provider: provision proportionally to the
        // most recent demand reading.
        let mut last_demand = 0.0_f64;
        loop {
            let action = (last_demand / action_factor).clamp(0.0, 1.0);
            let outcome = tokio::select! {
                outcome = controller.step(action) => outcome,
                _ = shutdown_rx.changed() => {
                    info!(episode, "stopping between ticks");
                    break 'episodes;
                }
            };

            match outcome {
                Ok(outcome) => {
                    last_demand = outcome.info.raw_demand;
                    info!(
                        episode,
                        step = outcome.info.step_index,
                        demand = outcome.info.raw_demand,
                        servers = outcome.info.server_count,
                        reward = outcome.reward,
                        stale = outcome.info.signal_stale,
                        "step"
                    );
                    if outcome.done {
                        break;
                    }
                }
                Err(e) => {
                    // Signal outage with a cold cache: skip the tick,
                    // the loop itself stays live.
                    warn!(episode, error = %e, "tick skipped");
                }
            }
        }

        if episode_budget > 0 && episode >= episode_budget {
            break;
        }
    }

    info!("fleetscale daemon stopped");
    Ok(())
}
