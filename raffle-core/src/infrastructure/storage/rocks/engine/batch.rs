use super::RocksStorage;
use crate::domain::{BlockData, Raffle, ResultsTableEntry};
use crate::foundation::RaffleError;
use crate::infrastructure::storage::rocks::schema::*;
use crate::infrastructure::storage::rocks::util::acquire_with_timeout;
use crate::infrastructure::storage::round::StagedRound;
use crate::infrastructure::storage::RoundBatch;
use log::debug;
use rocksdb::WriteBatch;

pub(super) struct RocksRoundBatch<'a> {
    pub(super) storage: &'a RocksStorage,
    pub(super) staged: StagedRound,
}

impl<'a> RocksRoundBatch<'a> {
    fn write_batch(storage: &RocksStorage, staged: &StagedRound) -> Result<WriteBatch, RaffleError> {
        let raffle_id = staged.raffle_id;
        let mut batch = WriteBatch::default();

        if let Some(block) = &staged.block {
            let cf = storage.cf_handle(CF_BLOCK_DATA)?;
            batch.put_cf(cf, RocksStorage::key_raffle_order(&raffle_id, block.order), RocksStorage::encode(block)?);
        }

        let entry_cf = storage.cf_handle(CF_RESULTS_ENTRY)?;
        let ranked_cf = storage.cf_handle(CF_RANKED)?;
        for entry in &staged.entries {
            batch.put_cf(entry_cf, RocksStorage::key_raffle_order(&raffle_id, entry.order), RocksStorage::encode(entry)?);
            batch.put_cf(ranked_cf, RocksStorage::key_raffle_poap(&raffle_id, &entry.poap_id), entry.order.to_be_bytes());
        }

        if staged.finalize {
            let key = RocksStorage::key_raffle(&raffle_id);
            let mut raffle = storage
                .get_value::<Raffle>(CF_RAFFLE, &key)?
                .ok_or(RaffleError::RaffleNotFound(raffle_id))?;
            raffle.finalized = true;
            batch.put_cf(storage.cf_handle(CF_RAFFLE)?, key, RocksStorage::encode(&raffle)?);
        }
        Ok(batch)
    }
}

impl<'a> RoundBatch for RocksRoundBatch<'a> {
    fn put_block_data(&mut self, block: BlockData) -> Result<(), RaffleError> {
        self.staged.stage_block(block)
    }

    fn put_entry(&mut self, entry: ResultsTableEntry) -> Result<(), RaffleError> {
        self.staged.stage_entry(entry)
    }

    fn set_finalized(&mut self) -> Result<(), RaffleError> {
        self.staged.finalize = true;
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), RaffleError> {
        let RocksRoundBatch { storage, staged } = *self;
        if staged.is_empty() {
            return Ok(());
        }
        let _guard = acquire_with_timeout(&storage.write_lock, "round commit")?;
        staged.validate(storage)?;
        let batch = Self::write_batch(storage, &staged)?;
        debug!(
            "rocksdb round commit raffle_id={} block={:?} entries={} finalize={}",
            staged.raffle_id,
            staged.block.as_ref().map(|block| block.block_number),
            staged.entries.len(),
            staged.finalize
        );
        storage.db.write(batch).map_err(|err| RaffleError::commit_failed(staged.raffle_id, format!("rocksdb write: {}", err)))
    }

    fn rollback(self: Box<Self>) {
        drop(self);
    }
}
