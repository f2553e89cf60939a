use raffle_core::domain::{block_candidate, next_block_tag, BlockData, BlockTag, RawBlock};
use raffle_core::foundation::RaffleId;

#[test]
fn test_ledger_step_when_rounds_progress_then_blocks_chain() {
    let raffle_id = RaffleId::new(3);
    let mut prev: Option<BlockData> = None;
    for offset in 0..5u64 {
        let tag = next_block_tag(prev.as_ref());
        let number = match tag {
            BlockTag::Latest => 1_000,
            BlockTag::Number(number) => number,
        };
        assert_eq!(number, 1_000 + offset);
        let candidate = block_candidate(raffle_id, prev.as_ref(), &RawBlock { number, gas_limit: 29_000_000 + offset });
        assert_eq!(candidate.order, offset);
        assert_eq!(candidate.seed, candidate.gas_limit);
        prev = Some(candidate);
    }
}
