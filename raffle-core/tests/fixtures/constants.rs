#![allow(dead_code)]

use raffle_core::foundation::RaffleId;

pub const TEST_RAFFLE_ID: RaffleId = RaffleId::new(7);
pub const TEST_RAFFLE_NAME: &str = "devcon-poap-raffle";
/// Block number the scripted chain starts at.
pub const TEST_FIRST_BLOCK: u64 = 18_000_000;
/// Typical mainnet gas limit; its units digit (0) selects the split digit.
pub const TEST_GAS_LIMIT: u64 = 30_000_000;
/// Upper bound on rounds in property loops; every round consumes one block.
pub const MAX_ROUNDS: usize = 10_000;
