use super::batch::RocksRoundBatch;
use super::RocksStorage;
use crate::domain::{BlockData, Participant, Raffle, ResultsTable, ResultsTableEntry};
use crate::foundation::{now_nanos, PoapId, RaffleError, RaffleId};
use crate::infrastructure::storage::rocks::schema::*;
use crate::infrastructure::storage::rocks::util::acquire_with_timeout;
use crate::infrastructure::storage::round::{RoundView, StagedRound};
use crate::infrastructure::storage::{RoundBatch, Storage};
use crate::storage_err;
use log::{debug, info, trace};
use rocksdb::IteratorMode;

impl Storage for RocksStorage {
    fn insert_raffle(&self, raffle: &Raffle) -> Result<bool, RaffleError> {
        let _guard = acquire_with_timeout(&self.write_lock, "insert_raffle")?;
        let key = Self::key_raffle(&raffle.id);
        if self.key_exists(CF_RAFFLE, &key)? {
            debug!("insert_raffle skipped, already present raffle_id={}", raffle.id);
            return Ok(false);
        }
        let cf = self.cf_handle(CF_RAFFLE)?;
        self.db.put_cf(cf, key, Self::encode(raffle)?).map_err(|err| storage_err!("rocksdb put_cf raffle", err))?;
        info!("raffle stored raffle_id={} one_address_one_vote={}", raffle.id, raffle.one_address_one_vote);
        Ok(true)
    }

    fn get_raffle(&self, raffle_id: &RaffleId) -> Result<Option<Raffle>, RaffleError> {
        trace!("get_raffle raffle_id={}", raffle_id);
        self.get_value(CF_RAFFLE, &Self::key_raffle(raffle_id))
    }

    fn list_raffles(&self) -> Result<Vec<Raffle>, RaffleError> {
        let cf = self.cf_handle(CF_RAFFLE)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|err| storage_err!("rocksdb iterator_cf raffle", err))?;
            out.push(Self::decode(&value)?);
        }
        Ok(out)
    }

    fn insert_participant(&self, participant: &Participant) -> Result<(), RaffleError> {
        let _guard = acquire_with_timeout(&self.write_lock, "insert_participant")?;
        let raffle_id = participant.raffle_id;
        let raffle_key = Self::key_raffle(&raffle_id);
        let raffle = self.get_value::<Raffle>(CF_RAFFLE, &raffle_key)?.ok_or(RaffleError::RaffleNotFound(raffle_id))?;
        if raffle.finalized {
            return Err(RaffleError::raffle_started(raffle_id, "raffle is finalized"));
        }
        if self.key_exists(CF_RESULTS_TABLE, &raffle_key)? || self.last_in_raffle::<BlockData>(CF_BLOCK_DATA, &raffle_id)?.is_some() {
            return Err(RaffleError::raffle_started(raffle_id, "ranking rounds have begun"));
        }
        let key = Self::key_raffle_poap(&raffle_id, &participant.poap_id);
        if self.key_exists(CF_PARTICIPANT, &key)? {
            return Err(RaffleError::DuplicateParticipant { raffle_id, poap_id: participant.poap_id });
        }
        let cf = self.cf_handle(CF_PARTICIPANT)?;
        self.db.put_cf(cf, key, Self::encode(participant)?).map_err(|err| storage_err!("rocksdb put_cf participant", err))
    }

    fn list_participants(&self, raffle_id: &RaffleId) -> Result<Vec<Participant>, RaffleError> {
        trace!("list_participants raffle_id={}", raffle_id);
        self.scan_raffle(CF_PARTICIPANT, raffle_id)
    }

    fn get_results_table(&self, raffle_id: &RaffleId) -> Result<Option<ResultsTable>, RaffleError> {
        self.get_value(CF_RESULTS_TABLE, &Self::key_raffle(raffle_id))
    }

    fn get_or_create_results_table(&self, raffle_id: &RaffleId) -> Result<ResultsTable, RaffleError> {
        if let Some(table) = self.get_results_table(raffle_id)? {
            return Ok(table);
        }
        let _guard = acquire_with_timeout(&self.write_lock, "get_or_create_results_table")?;
        let key = Self::key_raffle(raffle_id);
        if let Some(table) = self.get_value(CF_RESULTS_TABLE, &key)? {
            return Ok(table);
        }
        if !self.key_exists(CF_RAFFLE, &key)? {
            return Err(RaffleError::RaffleNotFound(*raffle_id));
        }
        let table = ResultsTable { raffle_id: *raffle_id, created_at_nanos: now_nanos() };
        let cf = self.cf_handle(CF_RESULTS_TABLE)?;
        self.db.put_cf(cf, key, Self::encode(&table)?).map_err(|err| storage_err!("rocksdb put_cf results_table", err))?;
        debug!("results table created raffle_id={}", raffle_id);
        Ok(table)
    }

    fn list_results_entries(&self, raffle_id: &RaffleId) -> Result<Vec<ResultsTableEntry>, RaffleError> {
        trace!("list_results_entries raffle_id={}", raffle_id);
        self.scan_raffle(CF_RESULTS_ENTRY, raffle_id)
    }

    fn last_block_data(&self, raffle_id: &RaffleId) -> Result<Option<BlockData>, RaffleError> {
        trace!("last_block_data raffle_id={}", raffle_id);
        self.last_in_raffle(CF_BLOCK_DATA, raffle_id)
    }

    fn list_block_data(&self, raffle_id: &RaffleId) -> Result<Vec<BlockData>, RaffleError> {
        self.scan_raffle(CF_BLOCK_DATA, raffle_id)
    }

    fn begin_round(&self, raffle_id: &RaffleId) -> Result<Box<dyn RoundBatch + '_>, RaffleError> {
        Ok(Box::new(RocksRoundBatch { storage: self, staged: StagedRound::new(*raffle_id) }))
    }

    fn health_check(&self) -> Result<(), RaffleError> {
        self.cf_handle(CF_METADATA)?;
        self.schema_version()?.ok_or_else(|| storage_err!("health_check", "schema version missing"))?;
        Ok(())
    }
}

impl RoundView for RocksStorage {
    fn raffle(&self, raffle_id: &RaffleId) -> Result<Option<Raffle>, RaffleError> {
        self.get_raffle(raffle_id)
    }

    fn last_block(&self, raffle_id: &RaffleId) -> Result<Option<BlockData>, RaffleError> {
        self.last_block_data(raffle_id)
    }

    fn has_participant(&self, raffle_id: &RaffleId, poap_id: &PoapId) -> Result<bool, RaffleError> {
        self.key_exists(CF_PARTICIPANT, &Self::key_raffle_poap(raffle_id, poap_id))
    }

    fn ranked_order(&self, raffle_id: &RaffleId, poap_id: &PoapId) -> Result<Option<u64>, RaffleError> {
        let cf = self.cf_handle(CF_RANKED)?;
        match self.db.get_cf(cf, Self::key_raffle_poap(raffle_id, poap_id)).map_err(|err| storage_err!("rocksdb get_cf ranked", err))? {
            Some(bytes) => Ok(Some(Self::decode_order(&bytes)?)),
            None => Ok(None),
        }
    }

    fn order_taken(&self, raffle_id: &RaffleId, order: u64) -> Result<bool, RaffleError> {
        self.key_exists(CF_RESULTS_ENTRY, &Self::key_raffle_order(raffle_id, order))
    }
}
