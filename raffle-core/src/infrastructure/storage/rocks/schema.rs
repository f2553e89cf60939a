use crate::foundation::{PoapId, RaffleId};

/// Helper to build storage keys consistently.
///
/// Integers are written big-endian so lexicographic key order matches numeric order.
pub struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    pub fn raffle(self, raffle_id: &RaffleId) -> Self {
        self.u64_be(raffle_id.value())
    }

    pub fn poap(self, poap_id: &PoapId) -> Self {
        self.u64_be(poap_id.value())
    }

    pub fn u64_be(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

pub const CF_METADATA: &str = "metadata";
pub const CF_DEFAULT: &str = "default";
pub const CF_RAFFLE: &str = "raffle";
/// `raffle_id ‖ poap_id -> Participant`
pub const CF_PARTICIPANT: &str = "participant";
pub const CF_RESULTS_TABLE: &str = "results_table";
/// `raffle_id ‖ order -> ResultsTableEntry`
pub const CF_RESULTS_ENTRY: &str = "results_entry";
/// `raffle_id ‖ poap_id -> order` (u64 big-endian)
pub const CF_RANKED: &str = "ranked";
/// `raffle_id ‖ round order -> BlockData`
pub const CF_BLOCK_DATA: &str = "block_data";

pub const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
