use anyhow::Context;
use reservation_service::{
    models::PollOutcome,
    services::{Clock, DryRunGateway, FileSnapshotSource},
    Config, PollingLoop, SystemClock,
};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = Config::from_env().context("Failed to load config")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    let snapshot_file = config
        .snapshot_file
        .clone()
        .context("RESERVER_SNAPSHOT_FILE must point at a departure board JSON file")?;

    let clock = SystemClock;
    let policy = config.policy(clock.now()).context("Invalid priority policy")?;

    info!(
        snapshot_file = %snapshot_file,
        ranking_mode = ?policy.ranking_mode(),
        min_time = %policy.min_time(),
        max_time = ?policy.max_time(),
        "Starting dry run"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    let poller = PollingLoop::new(
        FileSnapshotSource::new(snapshot_file),
        DryRunGateway::new(),
        clock,
        config.polling(),
    )
    .with_shutdown(shutdown_rx);

    let report = poller.run(&policy).await;
    info!(stats = ?report.stats, "Polling finished");

    match report.outcome {
        PollOutcome::Committed(seat) => {
            println!("Reserved {} departing {}", seat.category, seat.departure);
        }
        PollOutcome::DeadlineExceeded => {
            println!("No seat found before the deadline");
        }
        PollOutcome::Aborted(reason) => {
            error!(%reason, "Polling aborted");
            println!("Aborted: {}", reason);
        }
    }

    Ok(())
}
