//! Round staging shared by the storage backends.
//!
//! Backends collect a round into a [`StagedRound`] and, while holding their write lock,
//! re-check it against committed state through [`RoundView`] before applying anything.
//! A rejected round surfaces as `RoundConflict` and writes nothing.

use crate::domain::{BlockData, Raffle, ResultsTableEntry};
use crate::foundation::{PoapId, RaffleError, RaffleId, Result};
use std::collections::HashSet;

/// Committed state a round is validated against.
pub trait RoundView {
    fn raffle(&self, raffle_id: &RaffleId) -> Result<Option<Raffle>>;
    fn last_block(&self, raffle_id: &RaffleId) -> Result<Option<BlockData>>;
    fn has_participant(&self, raffle_id: &RaffleId, poap_id: &PoapId) -> Result<bool>;
    fn ranked_order(&self, raffle_id: &RaffleId, poap_id: &PoapId) -> Result<Option<u64>>;
    fn order_taken(&self, raffle_id: &RaffleId, order: u64) -> Result<bool>;
}

#[derive(Clone, Debug)]
pub struct StagedRound {
    pub raffle_id: RaffleId,
    pub block: Option<BlockData>,
    pub entries: Vec<ResultsTableEntry>,
    pub finalize: bool,
}

impl StagedRound {
    pub fn new(raffle_id: RaffleId) -> Self {
        Self { raffle_id, block: None, entries: Vec::new(), finalize: false }
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_none() && self.entries.is_empty() && !self.finalize
    }

    pub fn stage_block(&mut self, block: BlockData) -> Result<()> {
        if block.raffle_id != self.raffle_id {
            return Err(self.conflict(format!("block data belongs to raffle {}", block.raffle_id)));
        }
        if self.block.is_some() {
            return Err(self.conflict("round already staged a block"));
        }
        self.block = Some(block);
        Ok(())
    }

    pub fn stage_entry(&mut self, entry: ResultsTableEntry) -> Result<()> {
        if entry.raffle_id != self.raffle_id {
            return Err(self.conflict(format!("entry belongs to raffle {}", entry.raffle_id)));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Re-check the staged round against what is committed now.
    pub fn validate(&self, view: &impl RoundView) -> Result<()> {
        let raffle = view.raffle(&self.raffle_id)?.ok_or(RaffleError::RaffleNotFound(self.raffle_id))?;

        if !self.entries.is_empty() && self.block.is_none() {
            return Err(self.conflict("entries staged without block data"));
        }

        if let Some(block) = &self.block {
            if raffle.finalized {
                return Err(self.conflict("raffle already finalized"));
            }
            match view.last_block(&self.raffle_id)? {
                Some(last) => {
                    if block.order != last.order + 1 {
                        return Err(self.conflict(format!("round order {} does not follow {}", block.order, last.order)));
                    }
                    if block.block_number <= last.block_number {
                        return Err(self.conflict(format!(
                            "block_number {} does not increase past {}",
                            block.block_number, last.block_number
                        )));
                    }
                }
                None if block.order != 0 => {
                    return Err(self.conflict(format!("first round must have order 0, got {}", block.order)));
                }
                None => {}
            }
        }

        let mut staged_poaps = HashSet::new();
        let mut staged_orders = HashSet::new();
        for entry in &self.entries {
            if !view.has_participant(&self.raffle_id, &entry.poap_id)? {
                return Err(self.conflict(format!("poap_id {} is not a participant", entry.poap_id)));
            }
            if !staged_poaps.insert(entry.poap_id) {
                return Err(self.conflict(format!("poap_id {} staged twice", entry.poap_id)));
            }
            if let Some(order) = view.ranked_order(&self.raffle_id, &entry.poap_id)? {
                return Err(self.conflict(format!("poap_id {} already ranked at order {}", entry.poap_id, order)));
            }
            if !staged_orders.insert(entry.order) || view.order_taken(&self.raffle_id, entry.order)? {
                return Err(self.conflict(format!("order {} already assigned", entry.order)));
            }
        }
        Ok(())
    }

    fn conflict(&self, details: impl Into<String>) -> RaffleError {
        RaffleError::round_conflict(self.raffle_id, details)
    }
}
