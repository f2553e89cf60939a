use log::info;
use raffle_core::application::{import_raffle, RaffleImport};
use raffle_core::foundation::RaffleError;
use raffle_core::infrastructure::storage::Storage;
use serde_json::json;
use std::path::Path;

/// Import a raffle from a JSON file shaped like [`RaffleImport`].
pub fn import_from_json(json_path: &Path, storage: &dyn Storage) -> Result<(), RaffleError> {
    info!("import mode path={}", json_path.display());
    let json = std::fs::read_to_string(json_path)?;
    let import: RaffleImport = serde_json::from_str(&json)?;
    let report = import_raffle(storage, &import)?;
    let summary = json!({
        "raffle_id": report.raffle_id,
        "raffle_created": report.raffle_created,
        "participants_added": report.participants_added,
        "participants_skipped": report.participants_skipped,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
