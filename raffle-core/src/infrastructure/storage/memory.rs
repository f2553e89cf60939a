use crate::domain::{BlockData, Participant, Raffle, ResultsTable, ResultsTableEntry};
use crate::foundation::{now_nanos, PoapId, RaffleError, RaffleId, Result};
use crate::infrastructure::storage::round::{RoundView, StagedRound};
use crate::infrastructure::storage::{RoundBatch, Storage};
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct MemoryInner {
    raffle: BTreeMap<RaffleId, Raffle>,
    participant: BTreeMap<(RaffleId, PoapId), Participant>,
    results_table: HashMap<RaffleId, ResultsTable>,
    results_entry: BTreeMap<(RaffleId, u64), ResultsTableEntry>,
    ranked: HashMap<(RaffleId, PoapId), u64>,
    block_data: BTreeMap<(RaffleId, u64), BlockData>,
    fail_next_commit: bool,
}

impl MemoryInner {
    fn apply(&mut self, staged: StagedRound) {
        let raffle_id = staged.raffle_id;
        if let Some(block) = staged.block {
            self.block_data.insert((raffle_id, block.order), block);
        }
        for entry in staged.entries {
            self.ranked.insert((raffle_id, entry.poap_id), entry.order);
            self.results_entry.insert((raffle_id, entry.order), entry);
        }
        if staged.finalize {
            if let Some(raffle) = self.raffle.get_mut(&raffle_id) {
                raffle.finalized = true;
            }
        }
    }
}

impl RoundView for MemoryInner {
    fn raffle(&self, raffle_id: &RaffleId) -> Result<Option<Raffle>> {
        Ok(self.raffle.get(raffle_id).cloned())
    }

    fn last_block(&self, raffle_id: &RaffleId) -> Result<Option<BlockData>> {
        Ok(self.block_data.range((*raffle_id, 0)..=(*raffle_id, u64::MAX)).next_back().map(|(_, block)| block.clone()))
    }

    fn has_participant(&self, raffle_id: &RaffleId, poap_id: &PoapId) -> Result<bool> {
        Ok(self.participant.contains_key(&(*raffle_id, *poap_id)))
    }

    fn ranked_order(&self, raffle_id: &RaffleId, poap_id: &PoapId) -> Result<Option<u64>> {
        Ok(self.ranked.get(&(*raffle_id, *poap_id)).copied())
    }

    fn order_taken(&self, raffle_id: &RaffleId, order: u64) -> Result<bool> {
        Ok(self.results_entry.contains_key(&(*raffle_id, order)))
    }
}

/// In-process store with the same round semantics as the RocksDB backend.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next round commit fail with `StoreCommitFailure` after validation, writing nothing.
    pub fn fail_next_commit(&self) -> Result<()> {
        self.lock_inner()?.fail_next_commit = true;
        Ok(())
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| RaffleError::StorageError { operation: "memory storage lock".to_string(), details: "poisoned".to_string() })
    }
}

impl Storage for MemoryStorage {
    fn insert_raffle(&self, raffle: &Raffle) -> Result<bool> {
        let mut inner = self.lock_inner()?;
        if inner.raffle.contains_key(&raffle.id) {
            return Ok(false);
        }
        inner.raffle.insert(raffle.id, raffle.clone());
        Ok(true)
    }

    fn get_raffle(&self, raffle_id: &RaffleId) -> Result<Option<Raffle>> {
        trace!("get_raffle raffle_id={}", raffle_id);
        Ok(self.lock_inner()?.raffle.get(raffle_id).cloned())
    }

    fn list_raffles(&self) -> Result<Vec<Raffle>> {
        Ok(self.lock_inner()?.raffle.values().cloned().collect())
    }

    fn insert_participant(&self, participant: &Participant) -> Result<()> {
        let mut inner = self.lock_inner()?;
        let raffle_id = participant.raffle_id;
        let raffle = inner.raffle.get(&raffle_id).ok_or(RaffleError::RaffleNotFound(raffle_id))?;
        if raffle.finalized {
            return Err(RaffleError::raffle_started(raffle_id, "raffle is finalized"));
        }
        if inner.results_table.contains_key(&raffle_id) || inner.last_block(&raffle_id)?.is_some() {
            return Err(RaffleError::raffle_started(raffle_id, "ranking rounds have begun"));
        }
        let key = (raffle_id, participant.poap_id);
        if inner.participant.contains_key(&key) {
            return Err(RaffleError::DuplicateParticipant { raffle_id, poap_id: participant.poap_id });
        }
        inner.participant.insert(key, participant.clone());
        Ok(())
    }

    fn list_participants(&self, raffle_id: &RaffleId) -> Result<Vec<Participant>> {
        let inner = self.lock_inner()?;
        Ok(inner.participant.range((*raffle_id, PoapId::new(0))..=(*raffle_id, PoapId::new(u64::MAX))).map(|(_, p)| p.clone()).collect())
    }

    fn get_results_table(&self, raffle_id: &RaffleId) -> Result<Option<ResultsTable>> {
        Ok(self.lock_inner()?.results_table.get(raffle_id).cloned())
    }

    fn get_or_create_results_table(&self, raffle_id: &RaffleId) -> Result<ResultsTable> {
        let mut inner = self.lock_inner()?;
        if !inner.raffle.contains_key(raffle_id) {
            return Err(RaffleError::RaffleNotFound(*raffle_id));
        }
        let table =
            inner.results_table.entry(*raffle_id).or_insert_with(|| ResultsTable { raffle_id: *raffle_id, created_at_nanos: now_nanos() });
        Ok(table.clone())
    }

    fn list_results_entries(&self, raffle_id: &RaffleId) -> Result<Vec<ResultsTableEntry>> {
        let inner = self.lock_inner()?;
        Ok(inner.results_entry.range((*raffle_id, 0)..=(*raffle_id, u64::MAX)).map(|(_, entry)| entry.clone()).collect())
    }

    fn last_block_data(&self, raffle_id: &RaffleId) -> Result<Option<BlockData>> {
        self.lock_inner()?.last_block(raffle_id)
    }

    fn list_block_data(&self, raffle_id: &RaffleId) -> Result<Vec<BlockData>> {
        let inner = self.lock_inner()?;
        Ok(inner.block_data.range((*raffle_id, 0)..=(*raffle_id, u64::MAX)).map(|(_, block)| block.clone()).collect())
    }

    fn begin_round(&self, raffle_id: &RaffleId) -> Result<Box<dyn RoundBatch + '_>> {
        Ok(Box::new(MemoryRoundBatch { storage: self, staged: StagedRound::new(*raffle_id) }))
    }
}

struct MemoryRoundBatch<'a> {
    storage: &'a MemoryStorage,
    staged: StagedRound,
}

impl<'a> RoundBatch for MemoryRoundBatch<'a> {
    fn put_block_data(&mut self, block: BlockData) -> Result<()> {
        self.staged.stage_block(block)
    }

    fn put_entry(&mut self, entry: ResultsTableEntry) -> Result<()> {
        self.staged.stage_entry(entry)
    }

    fn set_finalized(&mut self) -> Result<()> {
        self.staged.finalize = true;
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let MemoryRoundBatch { storage, staged } = *self;
        let mut inner = storage.lock_inner()?;
        staged.validate(&*inner)?;
        if inner.fail_next_commit {
            inner.fail_next_commit = false;
            return Err(RaffleError::commit_failed(staged.raffle_id, "injected commit failure"));
        }
        debug!(
            "memory round commit raffle_id={} block={:?} entries={} finalize={}",
            staged.raffle_id,
            staged.block.as_ref().map(|block| block.block_number),
            staged.entries.len(),
            staged.finalize
        );
        inner.apply(staged);
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        drop(self);
    }
}
