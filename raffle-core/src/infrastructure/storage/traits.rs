use crate::domain::{BlockData, Participant, Raffle, ResultsTable, ResultsTableEntry};
use crate::foundation::{RaffleId, Result};

/// Durable store for raffles, participants, ranks and consumed blocks.
///
/// Read methods never observe a half-written round: every round lands through
/// [`Storage::begin_round`] as one atomic unit.
pub trait Storage: Send + Sync {
    /// Insert a raffle if absent.
    /// Returns `Ok(true)` if inserted, `Ok(false)` if a raffle with that id already existed.
    fn insert_raffle(&self, raffle: &Raffle) -> Result<bool>;
    fn get_raffle(&self, raffle_id: &RaffleId) -> Result<Option<Raffle>>;
    fn list_raffles(&self) -> Result<Vec<Raffle>>;

    /// Rejects unknown raffles and a `poap_id` already entered in the same raffle.
    /// Fails with `RaffleStarted` once the raffle is finalized or has a results table or any
    /// consumed block, checked under the same lock that guards round commits.
    fn insert_participant(&self, participant: &Participant) -> Result<()>;
    /// Participants of one raffle ordered by `poap_id`.
    fn list_participants(&self, raffle_id: &RaffleId) -> Result<Vec<Participant>>;

    fn get_results_table(&self, raffle_id: &RaffleId) -> Result<Option<ResultsTable>>;
    fn get_or_create_results_table(&self, raffle_id: &RaffleId) -> Result<ResultsTable>;
    /// Entries of one raffle ordered by rank `order`.
    fn list_results_entries(&self, raffle_id: &RaffleId) -> Result<Vec<ResultsTableEntry>>;

    fn last_block_data(&self, raffle_id: &RaffleId) -> Result<Option<BlockData>>;
    /// Consumed blocks of one raffle ordered by round `order`.
    fn list_block_data(&self, raffle_id: &RaffleId) -> Result<Vec<BlockData>>;

    /// Open the unit of work for one round of `raffle_id`.
    fn begin_round(&self, raffle_id: &RaffleId) -> Result<Box<dyn RoundBatch + '_>>;

    fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// All-or-nothing write of one round.
///
/// Nothing staged is visible before `commit`. A batch that is rolled back, dropped or whose
/// commit fails leaves the store unchanged.
pub trait RoundBatch {
    fn put_block_data(&mut self, block: BlockData) -> Result<()>;
    fn put_entry(&mut self, entry: ResultsTableEntry) -> Result<()>;
    fn set_finalized(&mut self) -> Result<()>;
    fn commit(self: Box<Self>) -> Result<()>;
    fn rollback(self: Box<Self>);
}
