use crate::domain::{BlockTag, RawBlock};
use crate::foundation::RaffleError;
use crate::infrastructure::oracle::BlockOracle;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Scripted in-memory ledger. Blocks above the tip do not exist yet.
#[derive(Default)]
pub struct StaticBlockOracle {
    blocks: Mutex<BTreeMap<u64, RawBlock>>,
    failures_pending: AtomicU32,
    requests: AtomicU64,
}

impl StaticBlockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: impl IntoIterator<Item = RawBlock>) -> Self {
        let oracle = Self::new();
        for block in blocks {
            oracle.push_block(block);
        }
        oracle
    }

    pub fn push_block(&self, block: RawBlock) {
        self.blocks.lock().insert(block.number, block);
    }

    /// Fail the next `count` requests with a retryable `OracleError`.
    pub fn fail_next_requests(&self, count: u32) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlockOracle for StaticBlockOracle {
    async fn get_block(&self, tag: BlockTag) -> Result<Option<RawBlock>, RaffleError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let pending = self.failures_pending.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if pending.is_ok() {
            return Err(RaffleError::oracle("static get_block", "scripted failure"));
        }
        let blocks = self.blocks.lock();
        Ok(match tag {
            BlockTag::Latest => blocks.values().next_back().copied(),
            BlockTag::Number(number) => blocks.get(&number).copied(),
        })
    }
}
