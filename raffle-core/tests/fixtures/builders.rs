#![allow(dead_code)]

use crate::fixtures::{TEST_RAFFLE_ID, TEST_RAFFLE_NAME};
use raffle_core::domain::{Participant, Raffle};
use raffle_core::foundation::RaffleId;
use raffle_core::infrastructure::storage::Storage;

pub struct RaffleBuilder {
    id: RaffleId,
    name: String,
    one_address_one_vote: bool,
    participants: Vec<(String, u64)>,
}

impl Default for RaffleBuilder {
    fn default() -> Self {
        Self { id: TEST_RAFFLE_ID, name: TEST_RAFFLE_NAME.to_string(), one_address_one_vote: false, participants: Vec::new() }
    }
}

impl RaffleBuilder {
    pub fn id(mut self, id: u64) -> Self {
        self.id = RaffleId::new(id);
        self
    }

    pub fn one_address_one_vote(mut self, enabled: bool) -> Self {
        self.one_address_one_vote = enabled;
        self
    }

    pub fn participant(mut self, address: impl Into<String>, poap_id: u64) -> Self {
        self.participants.push((address.into(), poap_id));
        self
    }

    /// One participant per poap id, each with its own address.
    pub fn poap_ids(mut self, poap_ids: &[u64]) -> Self {
        for poap_id in poap_ids {
            self.participants.push((format!("0x{poap_id:040x}"), *poap_id));
        }
        self
    }

    pub fn build(self) -> (Raffle, Vec<Participant>) {
        let raffle = Raffle::new(self.id, self.name, self.one_address_one_vote);
        let participants = self.participants.into_iter().map(|(address, poap_id)| Participant::new(self.id, address, poap_id)).collect();
        (raffle, participants)
    }

    pub fn seed(self, storage: &dyn Storage) -> Raffle {
        let (raffle, participants) = self.build();
        assert!(storage.insert_raffle(&raffle).expect("insert raffle"));
        for participant in &participants {
            storage.insert_participant(participant).expect("insert participant");
        }
        raffle
    }
}
