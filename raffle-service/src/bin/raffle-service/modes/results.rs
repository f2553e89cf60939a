use log::info;
use raffle_core::application::{RaffleResults, RaffleStatus, RankedParticipant};
use raffle_core::foundation::{RaffleError, RaffleId};
use raffle_core::infrastructure::storage::Storage;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct ResultsReport {
    status: RaffleStatus,
    ranking: Vec<RankedParticipant>,
}

pub fn dump_results(raffle_id: RaffleId, storage: Arc<dyn Storage>) -> Result<(), RaffleError> {
    info!("results mode raffle_id={}", raffle_id);
    let results = RaffleResults::new(storage);
    let report = ResultsReport { status: results.status(&raffle_id)?, ranking: results.ranking(&raffle_id)? };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
