//! Lock helpers for the RocksDB backend.

use crate::foundation::{RaffleError, STORAGE_LOCK_TIMEOUT_SECS};
use log::warn;
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

const LOCK_POLL_INTERVAL_MS: u64 = 10;

/// Acquire the store write lock, giving up after `STORAGE_LOCK_TIMEOUT_SECS`.
pub fn acquire_with_timeout<'a, T>(lock: &'a Mutex<T>, operation: &'static str) -> Result<MutexGuard<'a, T>, RaffleError> {
    acquire_with_timeout_for(lock, operation, Duration::from_secs(STORAGE_LOCK_TIMEOUT_SECS))
}

pub fn acquire_with_timeout_for<'a, T>(lock: &'a Mutex<T>, operation: &'static str, timeout: Duration) -> Result<MutexGuard<'a, T>, RaffleError> {
    let deadline = Instant::now() + timeout;
    loop {
        match lock.try_lock() {
            Ok(guard) => return Ok(guard),
            Err(TryLockError::Poisoned(_)) => {
                return Err(RaffleError::StorageError { operation: operation.to_string(), details: "write lock poisoned".to_string() });
            }
            Err(TryLockError::WouldBlock) if Instant::now() >= deadline => {
                warn!("storage write lock timed out operation={} timeout_ms={}", operation, timeout.as_millis());
                return Err(RaffleError::StorageLockTimeout { operation: operation.to_string(), timeout_secs: timeout.as_secs() });
            }
            Err(TryLockError::WouldBlock) => std::thread::sleep(Duration::from_millis(LOCK_POLL_INTERVAL_MS)),
        }
    }
}
