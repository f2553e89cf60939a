//! Ledger block oracle: the only network dependency of a round.

use crate::foundation::RaffleError;
use async_trait::async_trait;

pub use crate::domain::{BlockTag, RawBlock};

/// Read-only source of ledger blocks.
#[async_trait]
pub trait BlockOracle: Send + Sync {
    /// `Ok(None)` means the block does not exist yet. Transport and protocol failures are `Err`.
    async fn get_block(&self, tag: BlockTag) -> Result<Option<RawBlock>, RaffleError>;
}

pub mod circuit_breaker;
pub mod json_rpc;
pub mod retry;
pub mod static_chain;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
pub use json_rpc::{redact_url, JsonRpcBlockOracle};
pub use retry::retry;
pub use static_chain::StaticBlockOracle;
