use crate::domain::{assign_ranks, split_by_split_key, BlockData, Participant, Raffle, ResultsTable, ResultsTableEntry, SplitOutcome};
use crate::foundation::RaffleError;
use crate::infrastructure::storage::{RoundBatch, Storage};
use log::{debug, error, info};
use std::sync::Arc;

/// What one committed round wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReport {
    /// Consumed block, `None` for the empty-pool finalize.
    pub block: Option<BlockData>,
    pub ranked: usize,
    pub finalized: bool,
}

/// Ranks the eliminated participants and persists them with their block in one atomic batch.
#[derive(Clone)]
pub struct RoundCommitter {
    storage: Arc<dyn Storage>,
}

impl RoundCommitter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn commit(
        &self,
        raffle: &Raffle,
        table: &ResultsTable,
        pool: &[Participant],
        candidate: BlockData,
    ) -> Result<CommitReport, RaffleError> {
        let raffle_id = table.raffle_id;
        if pool.is_empty() {
            let mut batch = self.storage.begin_round(&raffle_id)?;
            batch.set_finalized()?;
            batch.commit()?;
            info!("raffle finalized with empty pool raffle_id={}", raffle_id);
            return Ok(CommitReport { block: None, ranked: 0, finalized: true });
        }

        let outcome = split_by_split_key(candidate.gas_limit, pool).map_err(|err| {
            error!(
                "elimination split failed raffle_id={} block_number={} pool_size={} error={}",
                raffle_id,
                candidate.block_number,
                pool.len(),
                err
            );
            err
        })?;
        if let SplitOutcome::NoMatch { significance } = &outcome {
            debug!(
                "round ranks nobody raffle_id={} block_number={} significance={}",
                raffle_id, candidate.block_number, significance
            );
        }
        let eliminated = outcome.eliminated();
        let entries = assign_ranks(raffle.id, pool.len(), eliminated);
        let finalized = !eliminated.is_empty() && eliminated.len() == pool.len();

        let mut batch = self.storage.begin_round(&raffle_id)?;
        if let Err(err) = stage(batch.as_mut(), candidate.clone(), &entries, finalized) {
            batch.rollback();
            return Err(err);
        }
        batch.commit()?;

        info!(
            "round committed raffle_id={} round_order={} block_number={} ranked={} remaining={} finalized={}",
            raffle_id,
            candidate.order,
            candidate.block_number,
            entries.len(),
            pool.len() - entries.len(),
            finalized
        );
        Ok(CommitReport { block: Some(candidate), ranked: entries.len(), finalized })
    }
}

fn stage(
    batch: &mut dyn RoundBatch,
    candidate: BlockData,
    entries: &[ResultsTableEntry],
    finalized: bool,
) -> Result<(), RaffleError> {
    batch.put_block_data(candidate)?;
    for entry in entries {
        batch.put_entry(entry.clone())?;
    }
    if finalized {
        batch.set_finalized()?;
    }
    Ok(())
}
