use crate::domain::{block_candidate, next_block_tag, BlockData, BlockTag, LedgerStep};
use crate::foundation::{RaffleError, RaffleId};
use crate::infrastructure::oracle::BlockOracle;
use log::debug;
use std::sync::Arc;

/// Fetches the block a round consumes and turns it into an unpersisted `BlockData` candidate.
#[derive(Clone)]
pub struct LedgerStepProvider {
    oracle: Arc<dyn BlockOracle>,
}

impl LedgerStepProvider {
    pub fn new(oracle: Arc<dyn BlockOracle>) -> Self {
        Self { oracle }
    }

    pub async fn next_step(&self, raffle_id: RaffleId, prev: Option<&BlockData>) -> Result<LedgerStep, RaffleError> {
        let tag = next_block_tag(prev);
        let Some(raw) = self.oracle.get_block(tag).await? else {
            debug!("no new block raffle_id={} requested={}", raffle_id, tag);
            return Ok(LedgerStep::NoNewBlock);
        };
        if let BlockTag::Number(requested) = tag {
            if raw.number != requested {
                return Err(RaffleError::InvalidBlockData {
                    field: "number".to_string(),
                    details: format!("requested block {} but oracle returned {}", requested, raw.number),
                });
            }
        }
        let candidate = block_candidate(raffle_id, prev, &raw);
        debug!(
            "block candidate raffle_id={} block_number={} gas_limit={} round_order={}",
            raffle_id, candidate.block_number, candidate.gas_limit, candidate.order
        );
        Ok(LedgerStep::Block(candidate))
    }
}
