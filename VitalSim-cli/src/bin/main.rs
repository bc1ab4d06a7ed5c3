use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};
use vital_sim::{publish_metadata, Cli, Simulator, SimulatorConfig};

/// The main entry point for the VitalSim simulator
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Merges environment and command line settings
/// 4. Loads the patient roster and builds the metrics sink
/// 5. Publishes metadata, or runs the simulation until shutdown
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    // Initialize tracing for structured logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_ansi(true)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    let cli = Cli::parse();
    let mut config = SimulatorConfig::from_env();
    cli.apply(&mut config);
    config.validate().context("Invalid simulator configuration")?;

    info!("🩺 Starting VitalSim patient simulator");

    let roster = config.load_roster().context("Failed to load patient profiles")?;
    info!("Loaded {} patient profiles", roster.len());

    let sink = config.build_sink().context("Failed to create metrics sink")?;

    if cli.publishes_metadata() {
        publish_metadata(&roster, &sink)
            .await
            .context("Failed to publish patient metadata")?;
        return Ok(());
    }

    let mut simulator = Simulator::new(roster, config.generator(), sink, config.random_source());
    let summary = simulator
        .run(config.interval, config.max_ticks, shutdown_signal())
        .await;

    info!(
        "Simulation stopped after {} ticks ({} points written, {} failed ticks)",
        summary.ticks, summary.points_written, summary.failed_ticks
    );
    Ok(())
}

/// Sets up a signal handler for graceful shutdown
///
/// Resolves on CTRL+C, or SIGTERM on Unix systems.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down simulator...");
}
