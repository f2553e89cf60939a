#![allow(dead_code)]

use crate::fixtures::{MAX_ROUNDS, TEST_FIRST_BLOCK, TEST_GAS_LIMIT};
use raffle_core::application::{RoundOrchestrator, RoundOutcome};
use raffle_core::domain::{BlockData, Participant, Raffle, RawBlock, ResultsTableEntry};
use raffle_core::foundation::RaffleId;
use raffle_core::infrastructure::oracle::{BlockOracle, StaticBlockOracle};
use raffle_core::infrastructure::storage::Storage;
use std::collections::BTreeSet;
use std::sync::Arc;

pub fn next_u64(state: &mut u64) -> u64 {
    // LCG parameters from Numerical Recipes; fine for deterministic test coverage.
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    *state >> 16
}

/// `count` distinct poap ids below `bound`.
pub fn distinct_poap_ids(state: &mut u64, count: usize, bound: u64) -> Vec<u64> {
    let mut ids = BTreeSet::new();
    while ids.len() < count {
        ids.insert(next_u64(state) % bound);
    }
    let mut ids = ids.into_iter().collect::<Vec<_>>();
    // Insertion order must not matter; shuffle with the same LCG.
    for i in (1..ids.len()).rev() {
        let j = (next_u64(state) % (i as u64 + 1)) as usize;
        ids.swap(i, j);
    }
    ids
}

pub fn raw_block(offset: u64, gas_limit: u64) -> RawBlock {
    RawBlock { number: TEST_FIRST_BLOCK + offset, gas_limit }
}

/// Ledger that reveals one block per round, the way a live chain grows.
///
/// `Latest` always answers the tip, so a chain with every block published up front would
/// let the first round skip straight to the end.
pub struct GrowingChain {
    pub oracle: Arc<StaticBlockOracle>,
    next_offset: u64,
}

impl Default for GrowingChain {
    fn default() -> Self {
        Self { oracle: Arc::new(StaticBlockOracle::new()), next_offset: 0 }
    }
}

impl GrowingChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, gas_limit: u64) -> RawBlock {
        let block = raw_block(self.next_offset, gas_limit);
        self.oracle.push_block(block);
        self.next_offset += 1;
        block
    }

    pub fn publish_random(&mut self, state: &mut u64) -> RawBlock {
        self.publish(TEST_GAS_LIMIT + next_u64(state) % 1_000)
    }

    pub fn oracle(&self) -> Arc<dyn BlockOracle> {
        self.oracle.clone()
    }
}

/// Publish one block and advance one round until the raffle is finalized.
///
/// Returns the number of `advance` calls that committed a round.
pub async fn drive_to_completion(
    orchestrator: &RoundOrchestrator,
    chain: &mut GrowingChain,
    state: &mut u64,
    raffle_id: &RaffleId,
) -> usize {
    for round in 0..MAX_ROUNDS {
        chain.publish_random(state);
        let outcome = orchestrator.advance(raffle_id).await.expect("advance");
        assert!(matches!(outcome, RoundOutcome::Committed(_)), "round {round} did not commit: {outcome:?}");
        if outcome.is_finalized() {
            return round + 1;
        }
    }
    panic!("raffle {raffle_id} not finalized after {MAX_ROUNDS} rounds");
}

/// Everything the store holds for one raffle.
#[derive(Debug, PartialEq, Eq)]
pub struct RaffleSnapshot {
    pub raffle: Option<Raffle>,
    pub participants: Vec<Participant>,
    pub has_results_table: bool,
    pub entries: Vec<ResultsTableEntry>,
    pub blocks: Vec<BlockData>,
}

pub fn snapshot(storage: &dyn Storage, raffle_id: &RaffleId) -> RaffleSnapshot {
    RaffleSnapshot {
        raffle: storage.get_raffle(raffle_id).expect("get raffle"),
        participants: storage.list_participants(raffle_id).expect("participants"),
        has_results_table: storage.get_results_table(raffle_id).expect("results table").is_some(),
        entries: storage.list_results_entries(raffle_id).expect("entries"),
        blocks: storage.list_block_data(raffle_id).expect("blocks"),
    }
}

/// Entry orders are exactly `0..n` and every entry belongs to a distinct participant.
pub fn assert_dense_ranking(entries: &[ResultsTableEntry], n: usize) {
    let orders = entries.iter().map(|entry| entry.order).collect::<BTreeSet<_>>();
    assert_eq!(orders, (0..n as u64).collect::<BTreeSet<_>>(), "orders must be a permutation of 0..{n}");
    let poaps = entries.iter().map(|entry| entry.poap_id).collect::<BTreeSet<_>>();
    assert_eq!(poaps.len(), entries.len(), "a participant was ranked twice");
}

/// Round orders are `0..m` and block numbers strictly increase.
pub fn assert_block_sequence(blocks: &[BlockData]) {
    for (index, block) in blocks.iter().enumerate() {
        assert_eq!(block.order, index as u64);
        assert_eq!(block.seed, block.gas_limit);
    }
    assert!(blocks.windows(2).all(|pair| pair[0].block_number < pair[1].block_number));
}
