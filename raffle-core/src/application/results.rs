use crate::foundation::{Address, PoapId, RaffleError, RaffleId};
use crate::application::RemainingPoolResolver;
use crate::infrastructure::storage::Storage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedParticipant {
    pub order: u64,
    pub poap_id: PoapId,
    pub address: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleStatus {
    pub raffle_id: RaffleId,
    pub finalized: bool,
    pub ranked: usize,
    pub remaining: usize,
    pub rounds_consumed: usize,
    pub last_block_number: Option<u64>,
}

/// Read-only queries over committed rounds.
#[derive(Clone)]
pub struct RaffleResults {
    storage: Arc<dyn Storage>,
}

impl RaffleResults {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Ranks assigned so far, winner first. Complete once the raffle is finalized.
    pub fn ranking(&self, raffle_id: &RaffleId) -> Result<Vec<RankedParticipant>, RaffleError> {
        self.storage.get_raffle(raffle_id)?.ok_or(RaffleError::RaffleNotFound(*raffle_id))?;
        Ok(self
            .storage
            .list_results_entries(raffle_id)?
            .into_iter()
            .map(|entry| RankedParticipant { order: entry.order, poap_id: entry.poap_id, address: entry.address })
            .collect())
    }

    pub fn status(&self, raffle_id: &RaffleId) -> Result<RaffleStatus, RaffleError> {
        let raffle = self.storage.get_raffle(raffle_id)?.ok_or(RaffleError::RaffleNotFound(*raffle_id))?;
        let ranked = self.storage.list_results_entries(raffle_id)?.len();
        let remaining = RemainingPoolResolver::new(self.storage.clone()).resolve(&raffle)?.len();
        let blocks = self.storage.list_block_data(raffle_id)?;
        Ok(RaffleStatus {
            raffle_id: *raffle_id,
            finalized: raffle.finalized,
            ranked,
            remaining,
            rounds_consumed: blocks.len(),
            last_block_number: blocks.last().map(|block| block.block_number),
        })
    }
}
