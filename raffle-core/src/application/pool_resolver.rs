use crate::domain::{remaining_pool, Participant, Raffle};
use crate::foundation::RaffleError;
use crate::infrastructure::storage::Storage;
use log::trace;
use std::sync::Arc;

/// Reads the ordered pool of participants that have no rank yet.
#[derive(Clone)]
pub struct RemainingPoolResolver {
    storage: Arc<dyn Storage>,
}

impl RemainingPoolResolver {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn resolve(&self, raffle: &Raffle) -> Result<Vec<Participant>, RaffleError> {
        let participants = self.storage.list_participants(&raffle.id)?;
        let entries = self.storage.list_results_entries(&raffle.id)?;
        let pool = remaining_pool(&participants, raffle.one_address_one_vote, &entries);
        trace!(
            "remaining pool resolved raffle_id={} participants={} ranked={} pool={}",
            raffle.id,
            participants.len(),
            entries.len(),
            pool.len()
        );
        Ok(pool)
    }
}
