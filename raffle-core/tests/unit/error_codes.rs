use raffle_core::foundation::{ErrorCode, PoapId, RaffleError, RaffleId};

#[test]
fn test_error_codes_when_classified_then_operator_errors_not_retryable() {
    let cases = [
        (RaffleError::commit_failed(RaffleId::new(1), "disk full"), ErrorCode::StoreCommitFailure, true),
        (RaffleError::OracleUnavailable("circuit open".to_string()), ErrorCode::OracleUnavailable, true),
        (RaffleError::StorageLockTimeout { operation: "round commit".to_string(), timeout_secs: 5 }, ErrorCode::StorageLockTimeout, true),
        (RaffleError::NoValidSplit { pool_size: 2, max_poap_id: 9, significance_cap: 2 }, ErrorCode::NoValidSplit, false),
        (RaffleError::round_conflict(RaffleId::new(1), "order taken"), ErrorCode::RoundConflict, false),
        (RaffleError::DuplicateParticipant { raffle_id: RaffleId::new(1), poap_id: PoapId::new(4) }, ErrorCode::DuplicateParticipant, false),
        (RaffleError::raffle_started(RaffleId::new(1), "finalized"), ErrorCode::RaffleStarted, false),
        (RaffleError::SchemaMismatch { stored: 0, current: 1 }, ErrorCode::SchemaMismatch, false),
    ];
    for (err, code, retryable) in cases {
        assert_eq!(err.code(), code);
        assert_eq!(err.context().code, code);
        assert_eq!(err.is_retryable(), retryable, "{err}");
    }
}
