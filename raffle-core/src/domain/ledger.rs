//! Ledger step derivation: which block a round asks for and the round's block candidate.

use crate::domain::model::BlockData;
use crate::foundation::RaffleId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block selector understood by the oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Latest => write!(f, "latest"),
            BlockTag::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Block fields the ranking consumes, as reported by the oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawBlock {
    pub number: u64,
    pub gas_limit: u64,
}

/// Outcome of asking the ledger for the next round's block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerStep {
    /// The requested block does not exist yet; nothing to do until it does.
    NoNewBlock,
    /// Unpersisted candidate for the next round.
    Block(BlockData),
}

/// The first round takes the latest block; later rounds take the block right after the last one consumed.
pub fn next_block_tag(prev: Option<&BlockData>) -> BlockTag {
    match prev {
        Some(prev) => BlockTag::Number(prev.block_number.saturating_add(1)),
        None => BlockTag::Latest,
    }
}

pub fn block_candidate(raffle_id: RaffleId, prev: Option<&BlockData>, raw: &RawBlock) -> BlockData {
    BlockData {
        raffle_id,
        block_number: raw.number,
        gas_limit: raw.gas_limit,
        seed: raw.gas_limit,
        order: prev.map(|prev| prev.order + 1).unwrap_or(0),
    }
}
