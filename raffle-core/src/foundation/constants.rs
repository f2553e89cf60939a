//! System-wide constants for raffle ranking.

/// Nanoseconds per second (10^9).
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Radix of the digit extraction used by the elimination splitter.
pub const SPLIT_DIGIT_RADIX: u64 = 10;

/// Bounded wait for the storage round-commit lock.
pub const STORAGE_LOCK_TIMEOUT_SECS: u64 = 5;

/// Base backoff used by the oracle circuit breaker when it opens.
pub const CIRCUIT_BREAKER_BASE_BACKOFF_SECS: u64 = 1;

/// Overrides `now_nanos()` in tests.
pub const TEST_NOW_NANOS_ENV_VAR: &str = "RAFFLE_TEST_NOW_NANOS";
