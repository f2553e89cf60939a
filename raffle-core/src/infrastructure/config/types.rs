use crate::foundation::RaffleId;
use crate::infrastructure::oracle::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RETRY_ATTEMPTS: usize = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Directory holding the RocksDB store. Filled from the resolved data dir when empty.
    #[serde(default)]
    pub data_dir: String,
    /// Wipe the store when its schema version does not match this build.
    #[serde(default)]
    pub allow_schema_wipe: bool,
}

/// Ledger block oracle endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OracleConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Attempts per block request, first try included.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

const fn default_retry_attempts() -> usize {
    DEFAULT_RETRY_ATTEMPTS
}

const fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            request_timeout_ms: default_request_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulerConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Raffles to drive. Empty means every unfinalized raffle in the store at startup.
    #[serde(default)]
    pub raffle_ids: Vec<RaffleId>,
    /// Exit `run` once every driven raffle is finalized.
    #[serde(default = "default_stop_when_finalized")]
    pub stop_when_finalized: bool,
}

const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

const fn default_stop_when_finalized() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { poll_interval_secs: default_poll_interval_secs(), raffle_ids: Vec::new(), stop_when_finalized: default_stop_when_finalized() }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter string such as `info` or `debug,raffle_core=trace`. Empty means `info`.
    #[serde(default)]
    pub level: String,
    /// Enables file appenders under this directory.
    #[serde(default)]
    pub log_dir: Option<String>,
}
