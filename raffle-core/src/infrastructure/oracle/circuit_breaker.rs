use crate::foundation::CIRCUIT_BREAKER_BASE_BACKOFF_SECS;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const MAX_BACKOFF_EXPONENT_SHIFT: u32 = 16;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failed requests before the circuit opens.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Upper bound for one open period (seconds). Open periods double up to this cap.
    #[serde(default = "default_open_duration_secs")]
    pub open_duration_secs: u64,
    /// Successful probes in half-open before closing.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_open_duration_secs() -> u64 {
    60
}

const fn default_success_threshold() -> u32 {
    1
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            open_duration_secs: default_open_duration_secs(),
            success_threshold: default_success_threshold(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
enum State {
    Closed { failures: u32 },
    Open { until: Instant, open_count: u32 },
    HalfOpen { successes: u32, open_count: u32 },
}

/// Guards the oracle endpoint: after repeated failures, requests are refused locally
/// until the open period elapses, then a probe decides whether to close again.
pub struct CircuitBreaker {
    cfg: CircuitBreakerConfig,
    state: parking_lot::Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(cfg: CircuitBreakerConfig) -> Self {
        Self { cfg, state: parking_lot::Mutex::new(State::Closed { failures: 0 }) }
    }

    pub fn state(&self) -> BreakerState {
        match *self.state.lock() {
            State::Closed { .. } => BreakerState::Closed,
            State::Open { .. } => BreakerState::Open,
            State::HalfOpen { .. } => BreakerState::HalfOpen,
        }
    }

    /// Whether a request may go out now. Moves an expired open circuit to half-open.
    pub fn allow(&self) -> bool {
        let now = Instant::now();
        let mut guard = self.state.lock();
        match *guard {
            State::Closed { .. } | State::HalfOpen { .. } => true,
            State::Open { until, open_count } if now < until => {
                debug!("oracle circuit open; refusing request retry_in_ms={} open_count={}", (until - now).as_millis(), open_count);
                false
            }
            State::Open { open_count, .. } => {
                info!("oracle circuit open->half_open open_count={}", open_count);
                *guard = State::HalfOpen { successes: 0, open_count };
                true
            }
        }
    }

    pub fn record_success(&self) {
        let mut guard = self.state.lock();
        match *guard {
            State::Closed { failures } if failures > 0 => *guard = State::Closed { failures: 0 },
            State::Closed { .. } | State::Open { .. } => {}
            State::HalfOpen { successes, open_count } => {
                let successes = successes.saturating_add(1);
                if successes >= self.cfg.success_threshold.max(1) {
                    info!("oracle circuit half_open->closed successes={}", successes);
                    *guard = State::Closed { failures: 0 };
                } else {
                    *guard = State::HalfOpen { successes, open_count };
                }
            }
        }
    }

    pub fn record_failure(&self) {
        let mut guard = self.state.lock();
        match *guard {
            State::Closed { failures } => {
                let failures = failures.saturating_add(1);
                if failures >= self.cfg.failure_threshold.max(1) {
                    let open_for = self.open_duration(1);
                    warn!("oracle circuit opened failures={} open_for_ms={}", failures, open_for.as_millis());
                    *guard = State::Open { until: Instant::now() + open_for, open_count: 1 };
                } else {
                    *guard = State::Closed { failures };
                }
            }
            State::HalfOpen { open_count, .. } => {
                let open_count = open_count.saturating_add(1);
                let open_for = self.open_duration(open_count);
                warn!("oracle circuit re-opened from half_open open_for_ms={} open_count={}", open_for.as_millis(), open_count);
                *guard = State::Open { until: Instant::now() + open_for, open_count };
            }
            State::Open { .. } => {}
        }
    }

    /// `base * 2^(open_count - 1)`, capped at `open_duration_secs`.
    fn open_duration(&self, open_count: u32) -> Duration {
        let max = Duration::from_secs(self.cfg.open_duration_secs.max(1));
        let shift = open_count.saturating_sub(1).min(MAX_BACKOFF_EXPONENT_SHIFT);
        Duration::from_secs(CIRCUIT_BREAKER_BASE_BACKOFF_SECS).checked_mul(1u32 << shift).map_or(max, |backoff| backoff.min(max))
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
