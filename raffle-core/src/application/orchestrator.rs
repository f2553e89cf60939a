use crate::application::{CommitReport, LedgerStepProvider, RemainingPoolResolver, RoundCommitter};
use crate::domain::LedgerStep;
use crate::foundation::{RaffleError, RaffleId};
use crate::infrastructure::oracle::BlockOracle;
use crate::infrastructure::storage::Storage;
use log::{debug, info};
use std::sync::Arc;

/// Result of one `advance` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The raffle was finalized before this call; nothing was read from the ledger.
    AlreadyFinalized,
    /// The next block does not exist yet; nothing was written.
    NoNewBlock,
    Committed(CommitReport),
}

impl RoundOutcome {
    pub fn is_finalized(&self) -> bool {
        match self {
            RoundOutcome::AlreadyFinalized => true,
            RoundOutcome::NoNewBlock => false,
            RoundOutcome::Committed(report) => report.finalized,
        }
    }
}

/// Entry point that advances a raffle by exactly one round.
///
/// Holds no state between calls: every call re-derives the pool and the last consumed
/// block from the store, so a failed call can simply be repeated. Calls for the same
/// raffle must not overlap.
#[derive(Clone)]
pub struct RoundOrchestrator {
    storage: Arc<dyn Storage>,
    resolver: RemainingPoolResolver,
    ledger: LedgerStepProvider,
    committer: RoundCommitter,
}

impl RoundOrchestrator {
    pub fn new(storage: Arc<dyn Storage>, oracle: Arc<dyn BlockOracle>) -> Self {
        Self {
            resolver: RemainingPoolResolver::new(storage.clone()),
            ledger: LedgerStepProvider::new(oracle),
            committer: RoundCommitter::new(storage.clone()),
            storage,
        }
    }

    /// Advance one round and report whether the raffle is now finalized.
    pub async fn advance_round(&self, raffle_id: &RaffleId) -> Result<bool, RaffleError> {
        Ok(self.advance(raffle_id).await?.is_finalized())
    }

    pub async fn advance(&self, raffle_id: &RaffleId) -> Result<RoundOutcome, RaffleError> {
        let raffle = self.storage.get_raffle(raffle_id)?.ok_or(RaffleError::RaffleNotFound(*raffle_id))?;
        if raffle.finalized {
            debug!("advance skipped, raffle already finalized raffle_id={}", raffle_id);
            return Ok(RoundOutcome::AlreadyFinalized);
        }

        let prev = self.storage.last_block_data(raffle_id)?;
        let candidate = match self.ledger.next_step(raffle.id, prev.as_ref()).await? {
            LedgerStep::NoNewBlock => return Ok(RoundOutcome::NoNewBlock),
            LedgerStep::Block(candidate) => candidate,
        };

        let table = self.storage.get_or_create_results_table(raffle_id)?;
        let pool = self.resolver.resolve(&raffle)?;
        let report = self.committer.commit(&raffle, &table, &pool, candidate)?;
        if report.finalized {
            info!("raffle finalized raffle_id={} rounds={}", raffle_id, report.block.as_ref().map_or(0, |block| block.order + 1));
        }
        Ok(RoundOutcome::Committed(report))
    }
}
