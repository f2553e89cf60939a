use crate::foundation::{PoapId, RaffleId};
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoValidSplit,
    StoreCommitFailure,
    RoundConflict,
    RaffleNotFound,
    DuplicateParticipant,
    RaffleStarted,
    StorageError,
    StorageLockTimeout,
    SchemaMismatch,
    SerializationError,
    OracleError,
    OracleUnavailable,
    InvalidBlockData,
    ConfigError,
    ParseError,
    Message,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum RaffleError {
    // === Ranking Errors ===
    /// Every digit significance up to the cap was uniform across the pool.
    #[error("no valid split: pool_size={pool_size} max_poap_id={max_poap_id} significance_cap={significance_cap}")]
    NoValidSplit { pool_size: usize, max_poap_id: u64, significance_cap: u32 },

    #[error("round commit failed raffle_id={raffle_id}: {details}")]
    StoreCommitFailure { raffle_id: RaffleId, details: String },

    #[error("round conflict raffle_id={raffle_id}: {details}")]
    RoundConflict { raffle_id: RaffleId, details: String },

    #[error("raffle not found: {0}")]
    RaffleNotFound(RaffleId),

    #[error("duplicate participant raffle_id={raffle_id} poap_id={poap_id}")]
    DuplicateParticipant { raffle_id: RaffleId, poap_id: PoapId },

    /// The participant set is frozen once a round has begun or the raffle is finalized.
    #[error("raffle already started raffle_id={raffle_id}: {details}")]
    RaffleStarted { raffle_id: RaffleId, details: String },

    // === Storage Errors ===
    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("storage lock timeout: {operation} (waited {timeout_secs}s)")]
    StorageLockTimeout { operation: String, timeout_secs: u64 },

    #[error("schema mismatch: stored={stored} current={current}")]
    SchemaMismatch { stored: u32, current: u32 },

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    // === Oracle Errors ===
    #[error("oracle error during {operation}: {details}")]
    OracleError { operation: String, details: String },

    #[error("oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("invalid block data field={field}: {details}")]
    InvalidBlockData { field: String, details: String },

    // === Configuration Errors ===
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, RaffleError>;

impl RaffleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RaffleError::NoValidSplit { .. } => ErrorCode::NoValidSplit,
            RaffleError::StoreCommitFailure { .. } => ErrorCode::StoreCommitFailure,
            RaffleError::RoundConflict { .. } => ErrorCode::RoundConflict,
            RaffleError::RaffleNotFound(_) => ErrorCode::RaffleNotFound,
            RaffleError::DuplicateParticipant { .. } => ErrorCode::DuplicateParticipant,
            RaffleError::RaffleStarted { .. } => ErrorCode::RaffleStarted,
            RaffleError::StorageError { .. } => ErrorCode::StorageError,
            RaffleError::StorageLockTimeout { .. } => ErrorCode::StorageLockTimeout,
            RaffleError::SchemaMismatch { .. } => ErrorCode::SchemaMismatch,
            RaffleError::SerializationError { .. } => ErrorCode::SerializationError,
            RaffleError::OracleError { .. } => ErrorCode::OracleError,
            RaffleError::OracleUnavailable(_) => ErrorCode::OracleUnavailable,
            RaffleError::InvalidBlockData { .. } => ErrorCode::InvalidBlockData,
            RaffleError::ConfigError(_) => ErrorCode::ConfigError,
            RaffleError::ParseError(_) => ErrorCode::ParseError,
            RaffleError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    /// Whether re-running the whole round later can succeed without operator action.
    ///
    /// A round that failed before or during its commit left no partial state behind, so
    /// transport and store hiccups are safe to retry from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RaffleError::StoreCommitFailure { .. }
                | RaffleError::StorageError { .. }
                | RaffleError::StorageLockTimeout { .. }
                | RaffleError::OracleError { .. }
                | RaffleError::OracleUnavailable(_)
        )
    }

    pub fn commit_failed(raffle_id: RaffleId, details: impl Into<String>) -> Self {
        RaffleError::StoreCommitFailure { raffle_id, details: details.into() }
    }

    pub fn round_conflict(raffle_id: RaffleId, details: impl Into<String>) -> Self {
        RaffleError::RoundConflict { raffle_id, details: details.into() }
    }

    pub fn raffle_started(raffle_id: RaffleId, details: impl Into<String>) -> Self {
        RaffleError::RaffleStarted { raffle_id, details: details.into() }
    }

    pub fn oracle(operation: impl Into<String>, details: impl Into<String>) -> Self {
        RaffleError::OracleError { operation: operation.into(), details: details.into() }
    }
}

impl From<rocksdb::Error> for RaffleError {
    fn from(err: rocksdb::Error) -> Self {
        RaffleError::StorageError { operation: "rocksdb".to_string(), details: err.to_string() }
    }
}

impl From<bincode::Error> for RaffleError {
    fn from(err: bincode::Error) -> Self {
        RaffleError::SerializationError { format: "bincode".to_string(), details: err.to_string() }
    }
}

impl From<reqwest::Error> for RaffleError {
    fn from(err: reqwest::Error) -> Self {
        RaffleError::OracleError { operation: "http".to_string(), details: err.to_string() }
    }
}

#[macro_export]
macro_rules! storage_err {
    ($op:expr, $err:expr) => {
        $crate::foundation::RaffleError::StorageError { operation: $op.into(), details: $err.to_string() }
    };
}

impl From<io::Error> for RaffleError {
    fn from(err: io::Error) -> Self {
        RaffleError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for RaffleError {
    fn from(err: serde_json::Error) -> Self {
        RaffleError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `RaffleError` variants at the call site to preserve context.
