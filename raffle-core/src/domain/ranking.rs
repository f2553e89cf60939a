//! Rank assignment for one round.

use crate::domain::model::{Participant, ResultsTableEntry};
use crate::foundation::RaffleId;

/// Entries for the participants eliminated this round, in pool order.
///
/// Survivors keep the better ranks `0..start_order`, so the eliminated take
/// `start_order, start_order + 1, ...` with `start_order = pool_len - eliminated.len()`.
pub fn assign_ranks(raffle_id: RaffleId, pool_len: usize, eliminated: &[Participant]) -> Vec<ResultsTableEntry> {
    let start_order = pool_len.saturating_sub(eliminated.len()) as u64;
    eliminated
        .iter()
        .enumerate()
        .map(|(offset, participant)| ResultsTableEntry {
            raffle_id,
            poap_id: participant.poap_id,
            address: participant.address.clone(),
            order: start_order + offset as u64,
        })
        .collect()
}

/// True when entry orders form exactly the permutation `0..entries.len()`.
pub fn is_dense_ranking(entries: &[ResultsTableEntry]) -> bool {
    let mut orders = entries.iter().map(|entry| entry.order).collect::<Vec<_>>();
    orders.sort_unstable();
    orders.iter().enumerate().all(|(index, order)| *order == index as u64)
}
