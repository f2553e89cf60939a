use log::{error, info, warn};
use raffle_core::application::RoundOrchestrator;
use raffle_core::foundation::{RaffleError, RaffleId};
use raffle_core::infrastructure::config::AppConfig;
use raffle_service::service::{DriveExit, Metrics, Scheduler};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const STATUS_REPORT_INTERVAL_SECS: u64 = 300;

/// Run the scheduler until every raffle exits or ctrl-c is received.
pub async fn run_scheduler(app_config: &AppConfig, orchestrator: Arc<RoundOrchestrator>, raffle_ids: Vec<RaffleId>) -> Result<(), RaffleError> {
    if raffle_ids.is_empty() {
        warn!("no raffles to drive; exiting");
        return Ok(());
    }
    let metrics = Arc::new(Metrics::new()?);
    let scheduler = Scheduler::new(orchestrator, metrics.clone(), &app_config.scheduler);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown signal received"),
            Err(err) => warn!("ctrl-c handler failed error={}", err),
        }
        let _ = shutdown_tx.send(true);
    });
    let reporter = spawn_status_reporter(metrics.clone());

    let reports = scheduler.run(raffle_ids, shutdown_rx).await;
    reporter.abort();

    let snapshot = metrics.snapshot();
    info!(
        "scheduler summary rounds_committed={} rounds_no_new_block={} raffles_finalized={} rounds_failed={} participants_ranked={}",
        snapshot.rounds_committed,
        snapshot.rounds_no_new_block,
        snapshot.raffles_finalized,
        snapshot.rounds_failed,
        snapshot.participants_ranked
    );

    let mut halted = 0usize;
    for report in &reports {
        match &report.exit {
            DriveExit::Finalized { rounds } => info!("raffle done raffle_id={} rounds={}", report.raffle_id, rounds),
            DriveExit::Shutdown => info!("raffle interrupted raffle_id={}", report.raffle_id),
            DriveExit::Halted { code, message } => {
                halted += 1;
                error!("raffle halted raffle_id={} code={:?} error={}", report.raffle_id, code, message);
            }
        }
    }
    if halted > 0 {
        return Err(RaffleError::Message(format!("{} raffle(s) halted; see error log", halted)));
    }
    Ok(())
}

fn spawn_status_reporter(metrics: Arc<Metrics>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(STATUS_REPORT_INTERVAL_SECS));
        // The first tick fires immediately; skip it so reports start after one interval.
        interval.tick().await;
        loop {
            interval.tick().await;
            let snapshot = metrics.snapshot();
            info!(
                "periodic status report uptime_minutes={} rounds_committed={} rounds_no_new_block={} raffles_finalized={} rounds_failed={}",
                snapshot.uptime.as_secs() / 60,
                snapshot.rounds_committed,
                snapshot.rounds_no_new_block,
                snapshot.raffles_finalized,
                snapshot.rounds_failed
            );
        }
    })
}
