use crate::fixtures::*;
use raffle_core::application::RoundOrchestrator;
use raffle_core::domain::{BlockData, Participant, ResultsTableEntry};
use raffle_core::foundation::{ErrorCode, PoapId, RaffleError, RaffleId};
use raffle_core::infrastructure::storage::{RocksStorage, Storage};
use std::sync::Arc;
use tempfile::TempDir;

fn block(raffle_id: RaffleId, offset: u64, order: u64) -> BlockData {
    BlockData { raffle_id, block_number: TEST_FIRST_BLOCK + offset, gas_limit: TEST_GAS_LIMIT, seed: TEST_GAS_LIMIT, order }
}

fn entry(raffle_id: RaffleId, poap_id: u64, order: u64) -> ResultsTableEntry {
    ResultsTableEntry { raffle_id, poap_id: PoapId::new(poap_id), address: format!("0x{poap_id:040x}").into(), order }
}

#[tokio::test]
async fn test_rocks_when_driven_to_completion_then_ranking_is_dense() {
    let dir = TempDir::new().expect("tempdir");
    let storage = Arc::new(RocksStorage::open_in_dir(dir.path()).expect("open"));
    let mut rng = 0xB10C;
    let poap_ids = distinct_poap_ids(&mut rng, 25, 100_000);
    let raffle = RaffleBuilder::default().poap_ids(&poap_ids).seed(storage.as_ref());

    let mut chain = GrowingChain::new();
    let orchestrator = RoundOrchestrator::new(storage.clone(), chain.oracle());
    drive_to_completion(&orchestrator, &mut chain, &mut rng, &raffle.id).await;

    let state = snapshot(storage.as_ref(), &raffle.id);
    assert_dense_ranking(&state.entries, poap_ids.len());
    assert_block_sequence(&state.blocks);
    assert!(state.raffle.is_some_and(|raffle| raffle.finalized));
}

#[tokio::test]
async fn test_rocks_when_reopened_then_rounds_resume_from_committed_state() {
    let dir = TempDir::new().expect("tempdir");
    let mut rng = 0xFEED;
    let mut chain = GrowingChain::new();
    let raffle_id;
    let before;
    {
        let storage = Arc::new(RocksStorage::open_in_dir(dir.path()).expect("open"));
        let raffle = RaffleBuilder::default().poap_ids(&[101, 202, 303, 404, 505, 606]).seed(storage.as_ref());
        raffle_id = raffle.id;
        let orchestrator = RoundOrchestrator::new(storage.clone(), chain.oracle());
        for _ in 0..2 {
            chain.publish_random(&mut rng);
            orchestrator.advance(&raffle_id).await.expect("advance");
        }
        before = snapshot(storage.as_ref(), &raffle_id);
    }

    let storage = Arc::new(RocksStorage::open_in_dir(dir.path()).expect("reopen"));
    assert_eq!(snapshot(storage.as_ref(), &raffle_id), before);
    assert_eq!(storage.last_block_data(&raffle_id).expect("last block"), before.blocks.last().cloned());

    let orchestrator = RoundOrchestrator::new(storage.clone(), chain.oracle());
    drive_to_completion(&orchestrator, &mut chain, &mut rng, &raffle_id).await;
    let state = snapshot(storage.as_ref(), &raffle_id);
    assert_dense_ranking(&state.entries, 6);
    assert_block_sequence(&state.blocks);
}

#[test]
fn test_rocks_when_checkpoint_created_then_copy_opens_with_same_rows() {
    let dir = TempDir::new().expect("tempdir");
    let storage = RocksStorage::open_in_dir(dir.path().join("live")).expect("open");
    let raffle = RaffleBuilder::default().poap_ids(&[1, 2, 3]).seed(&storage);
    let checkpoint_path = dir.path().join("checkpoint");
    storage.create_checkpoint(&checkpoint_path).expect("checkpoint");

    storage.insert_participant(&Participant::new(raffle.id, "late", 4)).expect("late participant");
    let copy = RocksStorage::open(&checkpoint_path).expect("open checkpoint");
    assert_eq!(copy.list_participants(&raffle.id).expect("participants").len(), 3);
    assert_eq!(storage.list_participants(&raffle.id).expect("participants").len(), 4);

    let err = storage.create_checkpoint(&checkpoint_path).expect_err("non-empty directory");
    assert_eq!(err.code(), ErrorCode::StorageError);
}

#[test]
fn test_rocks_when_round_rules_broken_then_commit_rejected_atomically() {
    let dir = TempDir::new().expect("tempdir");
    let storage = RocksStorage::open_in_dir(dir.path()).expect("open");
    let raffle = RaffleBuilder::default().poap_ids(&[10, 20, 30]).seed(&storage);
    storage.get_or_create_results_table(&raffle.id).expect("table");

    let mut batch = storage.begin_round(&raffle.id).expect("batch");
    batch.put_block_data(block(raffle.id, 0, 0)).expect("block");
    batch.put_entry(entry(raffle.id, 30, 2)).expect("entry");
    batch.commit().expect("round 0");

    // Replaying round 0 must not land a second time.
    let mut batch = storage.begin_round(&raffle.id).expect("batch");
    batch.put_block_data(block(raffle.id, 0, 0)).expect("block");
    batch.put_entry(entry(raffle.id, 20, 1)).expect("entry");
    let err = batch.commit().expect_err("replayed round");
    assert!(matches!(err, RaffleError::RoundConflict { .. }));

    // A ranked participant cannot be ranked again, and the block of the failed batch is dropped too.
    let mut batch = storage.begin_round(&raffle.id).expect("batch");
    batch.put_block_data(block(raffle.id, 1, 1)).expect("block");
    batch.put_entry(entry(raffle.id, 30, 1)).expect("entry");
    assert_eq!(batch.commit().expect_err("ranked twice").code(), ErrorCode::RoundConflict);

    assert_eq!(storage.list_block_data(&raffle.id).expect("blocks").len(), 1);
    assert_eq!(storage.list_results_entries(&raffle.id).expect("entries"), vec![entry(raffle.id, 30, 2)]);
}

#[test]
fn test_rocks_when_participant_duplicated_then_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let storage = RocksStorage::open_in_dir(dir.path()).expect("open");
    let raffle = RaffleBuilder::default().participant("0xaaaa", 9).seed(&storage);

    let err = storage.insert_participant(&Participant::new(raffle.id, "0xbbbb", 9)).expect_err("duplicate poap");
    assert!(matches!(err, RaffleError::DuplicateParticipant { poap_id, .. } if poap_id == PoapId::new(9)));
    let err = storage.insert_participant(&Participant::new(RaffleId::new(999), "0xbbbb", 1)).expect_err("unknown raffle");
    assert_eq!(err.code(), ErrorCode::RaffleNotFound);
    assert!(!storage.insert_raffle(&raffle).expect("second insert"));
}

#[test]
fn test_rocks_when_ranking_begun_then_participants_frozen() {
    let dir = TempDir::new().expect("tempdir");
    let storage = RocksStorage::open_in_dir(dir.path()).expect("open");
    let raffle = RaffleBuilder::default().poap_ids(&[10, 20, 30]).seed(&storage);
    storage.get_or_create_results_table(&raffle.id).expect("table");
    let err = storage.insert_participant(&Participant::new(raffle.id, "late", 41)).expect_err("table exists");
    assert_eq!(err.code(), ErrorCode::RaffleStarted);

    let mut batch = storage.begin_round(&raffle.id).expect("batch");
    batch.put_block_data(block(raffle.id, 0, 0)).expect("block");
    batch.put_entry(entry(raffle.id, 10, 2)).expect("entry");
    batch.commit().expect("round 0");
    let err = storage.insert_participant(&Participant::new(raffle.id, "late", 52)).expect_err("round committed");
    assert_eq!(err.code(), ErrorCode::RaffleStarted);

    // Orders 0 and 1 stay free for the two survivors.
    let mut batch = storage.begin_round(&raffle.id).expect("batch");
    batch.put_block_data(block(raffle.id, 1, 1)).expect("block");
    batch.put_entry(entry(raffle.id, 20, 1)).expect("entry");
    batch.put_entry(entry(raffle.id, 30, 0)).expect("entry");
    batch.set_finalized().expect("finalize");
    batch.commit().expect("round 1");
    let err = storage.insert_participant(&Participant::new(raffle.id, "late", 63)).expect_err("finalized");
    assert!(matches!(err, RaffleError::RaffleStarted { raffle_id, .. } if raffle_id == raffle.id));

    let state = snapshot(&storage, &raffle.id);
    assert_eq!(state.participants.len(), 3);
    assert_dense_ranking(&state.entries, 3);
}
