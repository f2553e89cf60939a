use crate::fixtures::*;
use raffle_core::application::{RoundOrchestrator, RoundOutcome};
use raffle_core::foundation::{ErrorCode, RaffleError, RaffleId};
use raffle_core::infrastructure::storage::{MemoryStorage, Storage};
use std::sync::Arc;

fn orchestrator(storage: &MemoryStorage, chain: &GrowingChain) -> RoundOrchestrator {
    RoundOrchestrator::new(Arc::new(storage.clone()), chain.oracle())
}

#[tokio::test]
async fn test_advance_when_driven_to_completion_then_ranking_is_a_permutation() {
    let mut rng = 0xA11CE;
    for case in 0..40u64 {
        let storage = MemoryStorage::new();
        let size = 1 + (next_u64(&mut rng) % 60) as usize;
        let bound = if case % 2 == 0 { 1_000 } else { 10_000_000 };
        let poap_ids = distinct_poap_ids(&mut rng, size, bound);
        let raffle = RaffleBuilder::default().id(case + 1).poap_ids(&poap_ids).seed(&storage);

        let mut chain = GrowingChain::new();
        let orchestrator = orchestrator(&storage, &chain);
        let rounds = drive_to_completion(&orchestrator, &mut chain, &mut rng, &raffle.id).await;

        let state = snapshot(&storage, &raffle.id);
        assert!(state.raffle.as_ref().is_some_and(|raffle| raffle.finalized));
        assert_dense_ranking(&state.entries, size);
        assert_block_sequence(&state.blocks);
        assert_eq!(state.blocks.len(), rounds);
    }
}

#[tokio::test]
async fn test_advance_when_units_digit_uniform_then_rounds_follow_tens_digit() {
    let storage = MemoryStorage::new();
    let raffle = RaffleBuilder::default().poap_ids(&[31, 11, 21]).seed(&storage);
    let mut chain = GrowingChain::new();
    let orchestrator = orchestrator(&storage, &chain);

    // Digit 1: tens digits are 1,2,3, so 11 leaves first with the worst rank.
    chain.publish(30_000_001);
    assert!(!orchestrator.advance_round(&raffle.id).await.expect("round 0"));
    // Digit 5: nobody matches; the block is consumed without ranking anyone.
    chain.publish(30_000_005);
    assert!(!orchestrator.advance_round(&raffle.id).await.expect("round 1"));
    // Digit 3 ranks 31.
    chain.publish(30_000_003);
    assert!(!orchestrator.advance_round(&raffle.id).await.expect("round 2"));
    // Single survivor wins regardless of the key.
    chain.publish(30_000_008);
    assert!(orchestrator.advance_round(&raffle.id).await.expect("round 3"));

    let state = snapshot(&storage, &raffle.id);
    let ranking = state.entries.iter().map(|entry| (entry.order, entry.poap_id.value())).collect::<Vec<_>>();
    assert_eq!(ranking, vec![(0, 21), (1, 31), (2, 11)]);
    assert_eq!(state.blocks.len(), 4);
    assert_eq!(state.blocks[1].gas_limit, 30_000_005);
    assert_block_sequence(&state.blocks);
}

#[tokio::test]
async fn test_advance_when_no_new_block_then_state_unchanged() {
    let storage = MemoryStorage::new();
    let raffle = RaffleBuilder::default().poap_ids(&[3, 14, 15, 92, 65]).seed(&storage);
    let mut chain = GrowingChain::new();
    let orchestrator = orchestrator(&storage, &chain);

    assert_eq!(orchestrator.advance(&raffle.id).await.expect("empty ledger"), RoundOutcome::NoNewBlock);

    chain.publish(TEST_GAS_LIMIT + 4);
    assert!(matches!(orchestrator.advance(&raffle.id).await.expect("round 0"), RoundOutcome::Committed(_)));
    let before = snapshot(&storage, &raffle.id);

    for _ in 0..3 {
        assert_eq!(orchestrator.advance(&raffle.id).await.expect("no new block"), RoundOutcome::NoNewBlock);
    }
    assert_eq!(snapshot(&storage, &raffle.id), before);
}

#[tokio::test]
async fn test_advance_when_commit_fails_then_nothing_written_and_retry_succeeds() {
    let storage = MemoryStorage::new();
    let raffle = RaffleBuilder::default().poap_ids(&[10, 20, 30, 40, 51]).seed(&storage);
    let mut chain = GrowingChain::new();
    let orchestrator = orchestrator(&storage, &chain);

    chain.publish(30_000_001);
    orchestrator.advance(&raffle.id).await.expect("round 0");
    let before = snapshot(&storage, &raffle.id);
    assert_eq!(before.entries.len(), 1);

    chain.publish(30_000_002);
    storage.fail_next_commit().expect("inject");
    let err = orchestrator.advance(&raffle.id).await.expect_err("injected failure");
    assert_eq!(err.code(), ErrorCode::StoreCommitFailure);
    assert!(err.is_retryable());
    assert_eq!(snapshot(&storage, &raffle.id), before);

    let outcome = orchestrator.advance(&raffle.id).await.expect("retry");
    let RoundOutcome::Committed(report) = &outcome else { panic!("retry did not commit: {outcome:?}") };
    let block = report.block.clone().expect("block consumed");
    assert_eq!(block.block_number, TEST_FIRST_BLOCK + 1);
    assert_eq!(block.order, 1);
    assert_eq!(report.ranked, 1);
}

#[tokio::test]
async fn test_advance_when_oracle_fails_then_error_is_retryable_and_nothing_written() {
    let storage = MemoryStorage::new();
    let raffle = RaffleBuilder::default().poap_ids(&[5, 6, 7]).seed(&storage);
    let mut chain = GrowingChain::new();
    chain.publish(TEST_GAS_LIMIT + 6);
    let orchestrator = orchestrator(&storage, &chain);
    let before = snapshot(&storage, &raffle.id);

    chain.oracle.fail_next_requests(1);
    let err = orchestrator.advance(&raffle.id).await.expect_err("oracle failure");
    assert!(err.is_retryable());
    assert_eq!(snapshot(&storage, &raffle.id), before);

    assert!(matches!(orchestrator.advance(&raffle.id).await.expect("retry"), RoundOutcome::Committed(_)));
}

#[tokio::test]
async fn test_advance_when_finalized_then_no_ledger_reads() {
    let storage = MemoryStorage::new();
    let raffle = RaffleBuilder::default().poap_ids(&[42]).seed(&storage);
    let mut chain = GrowingChain::new();
    chain.publish(TEST_GAS_LIMIT);
    let orchestrator = orchestrator(&storage, &chain);

    assert!(orchestrator.advance_round(&raffle.id).await.expect("single participant wins"));
    let requests = chain.oracle.request_count();
    let before = snapshot(&storage, &raffle.id);

    chain.publish(TEST_GAS_LIMIT + 1);
    assert_eq!(orchestrator.advance(&raffle.id).await.expect("finalized"), RoundOutcome::AlreadyFinalized);
    assert!(orchestrator.advance_round(&raffle.id).await.expect("still finalized"));
    assert_eq!(chain.oracle.request_count(), requests);
    assert_eq!(snapshot(&storage, &raffle.id), before);
}

#[tokio::test]
async fn test_advance_when_raffle_has_no_participants_then_finalized_without_block() {
    let storage = MemoryStorage::new();
    let raffle = RaffleBuilder::default().seed(&storage);
    let mut chain = GrowingChain::new();
    chain.publish(TEST_GAS_LIMIT);
    let orchestrator = orchestrator(&storage, &chain);

    let outcome = orchestrator.advance(&raffle.id).await.expect("empty raffle");
    let RoundOutcome::Committed(report) = &outcome else { panic!("expected commit: {outcome:?}") };
    assert_eq!(report.block, None);
    assert!(outcome.is_finalized());

    let state = snapshot(&storage, &raffle.id);
    assert!(state.blocks.is_empty());
    assert!(state.entries.is_empty());
}

#[tokio::test]
async fn test_advance_when_raffle_unknown_then_not_found() {
    let storage = MemoryStorage::new();
    let chain = GrowingChain::new();
    let orchestrator = orchestrator(&storage, &chain);
    let err = orchestrator.advance(&RaffleId::new(404)).await.expect_err("unknown");
    assert!(matches!(err, RaffleError::RaffleNotFound(id) if id == RaffleId::new(404)));
}

#[tokio::test]
async fn test_advance_when_one_address_one_vote_then_extra_tickets_never_ranked() {
    let storage = MemoryStorage::new();
    let raffle = RaffleBuilder::default()
        .one_address_one_vote(true)
        .participant("0xaaaa", 5)
        .participant("0xaaaa", 2)
        .participant("0xbbbb", 9)
        .participant("0xcccc", 14)
        .participant("0xcccc", 140)
        .seed(&storage);
    let mut chain = GrowingChain::new();
    let orchestrator = orchestrator(&storage, &chain);
    let mut rng = 99;
    drive_to_completion(&orchestrator, &mut chain, &mut rng, &raffle.id).await;

    let state = snapshot(&storage, &raffle.id);
    assert_dense_ranking(&state.entries, 3);
    let mut ranked = state.entries.iter().map(|entry| entry.poap_id.value()).collect::<Vec<_>>();
    ranked.sort_unstable();
    assert_eq!(ranked, vec![2, 9, 14]);
}

#[tokio::test]
async fn test_advance_when_raffles_share_a_ledger_then_they_progress_independently() {
    let storage = MemoryStorage::new();
    let first = RaffleBuilder::default().id(1).poap_ids(&[1, 2, 3, 4]).seed(&storage);
    let second = RaffleBuilder::default().id(2).poap_ids(&[100, 200]).seed(&storage);
    let mut chain = GrowingChain::new();
    let orchestrator = orchestrator(&storage, &chain);

    chain.publish(30_000_003);
    orchestrator.advance(&first.id).await.expect("first raffle round 0");
    chain.publish(30_000_002);
    orchestrator.advance(&second.id).await.expect("second raffle round 0");

    let first_blocks = storage.list_block_data(&first.id).expect("blocks");
    let second_blocks = storage.list_block_data(&second.id).expect("blocks");
    assert_eq!(first_blocks[0].block_number, TEST_FIRST_BLOCK);
    // The second raffle starts from the tip it sees, not from the first raffle's block.
    assert_eq!(second_blocks[0].block_number, TEST_FIRST_BLOCK + 1);
    assert_eq!(second_blocks[0].order, 0);
}
