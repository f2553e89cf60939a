//! Bulk loading of a raffle and its participants.

use crate::domain::{Participant, Raffle};
use crate::foundation::{now_nanos, PoapId, RaffleError, RaffleId};
use crate::infrastructure::storage::Storage;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ParticipantImport {
    pub address: String,
    pub poap_id: u64,
}

/// JSON shape accepted by `import`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RaffleImport {
    pub id: RaffleId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub one_address_one_vote: bool,
    #[serde(default)]
    pub participants: Vec<ParticipantImport>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportReport {
    pub raffle_id: RaffleId,
    pub raffle_created: bool,
    pub participants_added: usize,
    /// Rows already stored with the same address.
    pub participants_skipped: usize,
}

/// Insert the raffle if absent and every participant not yet stored.
///
/// The whole file is checked against the stored participants before anything is written, so a
/// rerun of the same file is a no-op. A `poap_id` listed twice in the file, or already stored
/// under a different address, fails with `DuplicateParticipant`.
pub fn import_raffle(storage: &dyn Storage, import: &RaffleImport) -> Result<ImportReport, RaffleError> {
    let stored: HashMap<PoapId, Participant> = match storage.get_raffle(&import.id)? {
        Some(_) => storage.list_participants(&import.id)?.into_iter().map(|participant| (participant.poap_id, participant)).collect(),
        None => HashMap::new(),
    };

    let mut seen = HashSet::new();
    let mut pending = Vec::new();
    for row in &import.participants {
        let poap_id = PoapId::new(row.poap_id);
        if !seen.insert(poap_id) {
            return Err(RaffleError::DuplicateParticipant { raffle_id: import.id, poap_id });
        }
        match stored.get(&poap_id) {
            Some(existing) if existing.address.as_str() == row.address => {}
            Some(_) => return Err(RaffleError::DuplicateParticipant { raffle_id: import.id, poap_id }),
            None => pending.push(Participant::new(import.id, row.address.as_str(), row.poap_id)),
        }
    }

    let mut raffle = Raffle::new(import.id, import.name.clone(), import.one_address_one_vote);
    raffle.created_at_nanos = now_nanos();
    let raffle_created = storage.insert_raffle(&raffle)?;
    for participant in &pending {
        storage.insert_participant(participant)?;
    }
    let participants_skipped = import.participants.len() - pending.len();
    info!(
        "raffle imported raffle_id={} created={} added={} skipped={}",
        import.id,
        raffle_created,
        pending.len(),
        participants_skipped
    );
    Ok(ImportReport { raffle_id: import.id, raffle_created, participants_added: pending.len(), participants_skipped })
}
