//! Remaining-pool resolution.
//!
//! The pool of a round is the candidate set of the raffle (deduplicated by address when
//! `one_address_one_vote` is set), sorted by `poap_id`, minus everyone already ranked.

use crate::domain::model::{Participant, ResultsTableEntry};
use crate::foundation::PoapId;
use std::collections::HashSet;

/// Candidate set before any ranking: deduplicated when requested, sorted by `poap_id`.
pub fn candidate_pool(participants: &[Participant], one_address_one_vote: bool) -> Vec<Participant> {
    let mut candidates = participants.to_vec();
    if one_address_one_vote {
        candidates.sort_by(|a, b| (&a.address, a.poap_id).cmp(&(&b.address, b.poap_id)));
        candidates.dedup_by(|later, first| later.address == first.address);
    }
    candidates.sort_by_key(|participant| participant.poap_id);
    candidates
}

/// Ordered participants that have no results table entry yet.
pub fn remaining_pool(participants: &[Participant], one_address_one_vote: bool, entries: &[ResultsTableEntry]) -> Vec<Participant> {
    if participants.is_empty() {
        return Vec::new();
    }
    let ranked: HashSet<PoapId> = entries.iter().map(|entry| entry.poap_id).collect();
    candidate_pool(participants, one_address_one_vote).into_iter().filter(|participant| !ranked.contains(&participant.poap_id)).collect()
}
