use crate::foundation::{Address, PoapId, RaffleId};
use serde::{Deserialize, Serialize};

/// Aggregate root. `finalized` is terminal: once set it never reverts.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Raffle {
    pub id: RaffleId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub finalized: bool,
    /// When set, only the lowest `poap_id` per address takes part in the ranking.
    #[serde(default)]
    pub one_address_one_vote: bool,
    #[serde(default)]
    pub created_at_nanos: u64,
}

impl Raffle {
    pub fn new(id: RaffleId, name: impl Into<String>, one_address_one_vote: bool) -> Self {
        Self { id, name: name.into(), finalized: false, one_address_one_vote, created_at_nanos: 0 }
    }
}

/// Entrant of exactly one raffle. Immutable once created.
///
/// `poap_id` is unique inside a raffle and is the only ordering/tie-breaking key.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct Participant {
    pub raffle_id: RaffleId,
    pub address: Address,
    pub poap_id: PoapId,
}

impl Participant {
    pub fn new(raffle_id: RaffleId, address: impl Into<Address>, poap_id: u64) -> Self {
        Self { raffle_id, address: address.into(), poap_id: PoapId::new(poap_id) }
    }
}

/// One per raffle, created lazily on the first round advance.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResultsTable {
    pub raffle_id: RaffleId,
    pub created_at_nanos: u64,
}

/// Final rank of one participant: `order` 0 is the overall winner.
///
/// Orders across a results table are unique, dense from 0 and never reassigned.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResultsTableEntry {
    pub raffle_id: RaffleId,
    pub poap_id: PoapId,
    pub address: Address,
    pub order: u64,
}

/// Ledger block consumed by one round. Append-only.
///
/// `order` is the round sequence number and is independent of entry ranks.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct BlockData {
    pub raffle_id: RaffleId,
    pub block_number: u64,
    /// Split key of the round.
    pub gas_limit: u64,
    /// Mirrors `gas_limit`.
    pub seed: u64,
    pub order: u64,
}
