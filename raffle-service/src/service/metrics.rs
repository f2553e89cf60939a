use log::debug;
use prometheus::{Encoder, IntCounterVec, IntGauge, Registry, TextEncoder};
use raffle_core::application::RoundOutcome;
use raffle_core::foundation::RaffleError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub const OUTCOME_COMMITTED: &str = "committed";
pub const OUTCOME_NO_NEW_BLOCK: &str = "no_new_block";
pub const OUTCOME_FINALIZED: &str = "finalized";
pub const OUTCOME_FAILED: &str = "failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub rounds_committed: u64,
    pub rounds_no_new_block: u64,
    pub raffles_finalized: u64,
    pub rounds_failed: u64,
    pub participants_ranked: u64,
}

pub struct Metrics {
    registry: Registry,
    rounds_total: IntCounterVec,
    raffles_active: IntGauge,
    started_at: Instant,
    rounds_committed: AtomicU64,
    rounds_no_new_block: AtomicU64,
    raffles_finalized: AtomicU64,
    rounds_failed: AtomicU64,
    participants_ranked: AtomicU64,
}

fn metrics_err(err: impl ToString) -> RaffleError {
    RaffleError::Message(format!("metrics: {}", err.to_string()))
}

impl Metrics {
    pub fn new() -> Result<Self, RaffleError> {
        debug!("initializing prometheus metrics");
        let registry = Registry::new();
        let rounds_total =
            IntCounterVec::new(prometheus::Opts::new("raffle_rounds_total", "Round advances by outcome"), &["outcome"]).map_err(metrics_err)?;
        let raffles_active = IntGauge::new("raffle_scheduler_active_raffles", "Raffles currently driven by the scheduler").map_err(metrics_err)?;

        registry.register(Box::new(rounds_total.clone())).map_err(metrics_err)?;
        registry.register(Box::new(raffles_active.clone())).map_err(metrics_err)?;

        Ok(Self {
            registry,
            rounds_total,
            raffles_active,
            started_at: Instant::now(),
            rounds_committed: AtomicU64::new(0),
            rounds_no_new_block: AtomicU64::new(0),
            raffles_finalized: AtomicU64::new(0),
            rounds_failed: AtomicU64::new(0),
            participants_ranked: AtomicU64::new(0),
        })
    }

    /// Count one `advance` result. A round that finalizes counts as committed and finalized.
    pub fn record_outcome(&self, outcome: &RoundOutcome) {
        match outcome {
            RoundOutcome::AlreadyFinalized => {}
            RoundOutcome::NoNewBlock => self.inc_round(OUTCOME_NO_NEW_BLOCK),
            RoundOutcome::Committed(report) => {
                self.inc_round(OUTCOME_COMMITTED);
                self.participants_ranked.fetch_add(report.ranked as u64, Ordering::Relaxed);
                if report.finalized {
                    self.inc_round(OUTCOME_FINALIZED);
                }
            }
        }
    }

    pub fn record_failure(&self) {
        self.inc_round(OUTCOME_FAILED);
    }

    pub fn inc_round(&self, outcome: &str) {
        self.rounds_total.with_label_values(&[outcome]).inc();
        let counter = match outcome {
            OUTCOME_COMMITTED => &self.rounds_committed,
            OUTCOME_NO_NEW_BLOCK => &self.rounds_no_new_block,
            OUTCOME_FINALIZED => &self.raffles_finalized,
            OUTCOME_FAILED => &self.rounds_failed,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_active_raffles(&self, count: usize) {
        self.raffles_active.set(count as i64);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.started_at.elapsed(),
            rounds_committed: self.rounds_committed.load(Ordering::Relaxed),
            rounds_no_new_block: self.rounds_no_new_block.load(Ordering::Relaxed),
            raffles_finalized: self.raffles_finalized.load(Ordering::Relaxed),
            rounds_failed: self.rounds_failed.load(Ordering::Relaxed),
            participants_ranked: self.participants_ranked.load(Ordering::Relaxed),
        }
    }

    pub fn encode(&self) -> Result<String, RaffleError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer).map_err(metrics_err)?;
        String::from_utf8(buffer).map_err(metrics_err)
    }
}
