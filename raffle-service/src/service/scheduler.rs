//! Periodic driver for round advances.
//!
//! Each raffle is owned by exactly one task, so `advance` calls for the same raffle never
//! overlap. Different raffles are driven in parallel.

use crate::service::metrics::Metrics;
use log::{debug, error, info, warn};
use raffle_core::application::{RoundOrchestrator, RoundOutcome};
use raffle_core::foundation::{ErrorCode, RaffleId};
use raffle_core::infrastructure::config::SchedulerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

/// Why a raffle stopped being driven.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriveExit {
    Finalized { rounds: u64 },
    /// A non-retryable error needs an operator.
    Halted { code: ErrorCode, message: String },
    Shutdown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriveReport {
    pub raffle_id: RaffleId,
    pub exit: DriveExit,
}

#[derive(Clone)]
pub struct Scheduler {
    orchestrator: Arc<RoundOrchestrator>,
    metrics: Arc<Metrics>,
    poll_interval: Duration,
    stop_when_finalized: bool,
}

impl Scheduler {
    pub fn new(orchestrator: Arc<RoundOrchestrator>, metrics: Arc<Metrics>, config: &SchedulerConfig) -> Self {
        Self {
            orchestrator,
            metrics,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            stop_when_finalized: config.stop_when_finalized,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Drive every raffle until it exits; returns one report per raffle.
    pub async fn run(&self, raffle_ids: Vec<RaffleId>, shutdown: watch::Receiver<bool>) -> Vec<DriveReport> {
        info!(
            "scheduler starting raffles={} poll_interval_ms={} stop_when_finalized={}",
            raffle_ids.len(),
            self.poll_interval.as_millis(),
            self.stop_when_finalized
        );
        let mut tasks = JoinSet::new();
        for raffle_id in raffle_ids {
            let scheduler = self.clone();
            let shutdown = shutdown.clone();
            tasks.spawn(async move { DriveReport { raffle_id, exit: scheduler.drive(raffle_id, shutdown).await } });
        }
        self.metrics.set_active_raffles(tasks.len());

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(err) => error!("raffle driver task failed error={}", err),
            }
            self.metrics.set_active_raffles(tasks.len());
        }
        reports.sort_by_key(|report| report.raffle_id);
        info!("scheduler stopped raffles={}", reports.len());
        reports
    }

    /// Advance one raffle on every tick until it finalizes, halts or shutdown is signalled.
    pub async fn drive(&self, raffle_id: RaffleId, mut shutdown: watch::Receiver<bool>) -> DriveExit {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut rounds = 0u64;
        loop {
            if *shutdown.borrow() {
                return DriveExit::Shutdown;
            }
            tokio::select! {
                _ = interval.tick() => {}
                changed = shutdown.changed() => {
                    // A dropped sender also means shutdown.
                    if changed.is_err() {
                        return DriveExit::Shutdown;
                    }
                    continue;
                }
            }

            match self.orchestrator.advance(&raffle_id).await {
                Ok(outcome) => {
                    self.metrics.record_outcome(&outcome);
                    match &outcome {
                        RoundOutcome::NoNewBlock => debug!("no new block yet raffle_id={}", raffle_id),
                        RoundOutcome::Committed(_) => rounds += 1,
                        RoundOutcome::AlreadyFinalized => {}
                    }
                    if outcome.is_finalized() && self.stop_when_finalized {
                        info!("raffle finalized; driver stopping raffle_id={} rounds={}", raffle_id, rounds);
                        return DriveExit::Finalized { rounds };
                    }
                }
                Err(err) if err.is_retryable() => {
                    self.metrics.record_failure();
                    warn!("round failed; retrying next tick raffle_id={} code={:?} error={}", raffle_id, err.code(), err);
                }
                Err(err) => {
                    self.metrics.record_failure();
                    error!("round failed; raffle needs operator attention raffle_id={} code={:?} error={}", raffle_id, err.code(), err);
                    return DriveExit::Halted { code: err.code(), message: err.to_string() };
                }
            }
        }
    }
}
