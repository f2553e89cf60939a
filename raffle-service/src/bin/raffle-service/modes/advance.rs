use log::info;
use raffle_core::application::{RoundOrchestrator, RoundOutcome};
use raffle_core::foundation::{RaffleError, RaffleId};
use serde_json::json;

/// Advance exactly one round and print what happened.
pub async fn advance_once(orchestrator: &RoundOrchestrator, raffle_id: RaffleId) -> Result<(), RaffleError> {
    info!("advance mode raffle_id={}", raffle_id);
    let outcome = orchestrator.advance(&raffle_id).await?;
    let summary = match &outcome {
        RoundOutcome::AlreadyFinalized => json!({ "raffle_id": raffle_id, "outcome": "already_finalized", "finalized": true }),
        RoundOutcome::NoNewBlock => json!({ "raffle_id": raffle_id, "outcome": "no_new_block", "finalized": false }),
        RoundOutcome::Committed(report) => json!({
            "raffle_id": raffle_id,
            "outcome": "committed",
            "block_number": report.block.as_ref().map(|block| block.block_number),
            "round_order": report.block.as_ref().map(|block| block.order),
            "ranked": report.ranked,
            "finalized": report.finalized,
        }),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
