//! Elimination splitter.
//!
//! A round's split key `K` selects the digit `K mod 10`. Starting at the units digit and
//! moving to higher significance, the pool is scanned for participants whose `poap_id`
//! digit at that significance equals the selected digit. A significance where every
//! participant shows the same digit carries no entropy and is skipped. The first
//! significance where the digits differ decides the round.
//!
//! The scan is bounded: once the significance exceeds every remaining `poap_id`, all digits
//! read as zero and stay uniform forever, so the loop stops after
//! `decimal_digits(max_poap_id) + 1` significances and reports `NoValidSplit`.

use crate::domain::model::Participant;
use crate::foundation::{RaffleError, Result, SPLIT_DIGIT_RADIX};

/// Result of splitting a pool with one split key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitOutcome {
    /// Participants ranked this round, in pool order.
    ///
    /// Never empty. Never the full pool unless the pool has exactly one member.
    Eliminated(Vec<Participant>),
    /// The deciding significance divided the pool, but nobody shows the selected digit.
    /// The round consumes its block and ranks nobody.
    NoMatch { significance: u128 },
}

impl SplitOutcome {
    pub fn eliminated(&self) -> &[Participant] {
        match self {
            SplitOutcome::Eliminated(eliminated) => eliminated,
            SplitOutcome::NoMatch { .. } => &[],
        }
    }
}

/// Index-level outcome over raw `poap_id`s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DigitSplit {
    Matches { indices: Vec<usize>, significance: u128 },
    NoMatch { significance: u128 },
}

pub fn decimal_digits(mut value: u64) -> u32 {
    let mut digits = 0;
    while value > 0 {
        value /= SPLIT_DIGIT_RADIX;
        digits += 1;
    }
    digits
}

/// Number of significances tried before giving up: `ceil(log10(max_poap_id + 1)) + 1`.
pub fn significance_cap(max_poap_id: u64) -> u32 {
    decimal_digits(max_poap_id) + 1
}

fn digit_at(poap_id: u64, significance: u128) -> u64 {
    ((u128::from(poap_id) / significance) % u128::from(SPLIT_DIGIT_RADIX)) as u64
}

/// Split raw `poap_id`s. A single id is always returned as the sole match.
pub fn split_poap_ids(split_key: u64, poap_ids: &[u64]) -> Result<DigitSplit> {
    let Some(max_poap_id) = poap_ids.iter().copied().max() else {
        return Err(RaffleError::NoValidSplit { pool_size: 0, max_poap_id: 0, significance_cap: 0 });
    };
    if poap_ids.len() == 1 {
        return Ok(DigitSplit::Matches { indices: vec![0], significance: 1 });
    }

    let last_digit = split_key % SPLIT_DIGIT_RADIX;
    let cap = significance_cap(max_poap_id);
    let mut significance: u128 = 1;

    for _ in 0..cap {
        let mut matches = Vec::new();
        let mut first_digit = None;
        let mut uniform = true;

        for (index, poap_id) in poap_ids.iter().enumerate() {
            let digit = digit_at(*poap_id, significance);
            if digit == last_digit {
                matches.push(index);
            }
            match first_digit {
                None => first_digit = Some(digit),
                Some(first) if first != digit => uniform = false,
                Some(_) => {}
            }
        }

        if !uniform {
            if matches.is_empty() {
                return Ok(DigitSplit::NoMatch { significance });
            }
            return Ok(DigitSplit::Matches { indices: matches, significance });
        }
        significance *= u128::from(SPLIT_DIGIT_RADIX);
    }

    Err(RaffleError::NoValidSplit { pool_size: poap_ids.len(), max_poap_id, significance_cap: cap })
}

/// Split an ordered pool with the round's split key.
pub fn split_by_split_key(split_key: u64, pool: &[Participant]) -> Result<SplitOutcome> {
    let poap_ids = pool.iter().map(|participant| participant.poap_id.value()).collect::<Vec<_>>();
    match split_poap_ids(split_key, &poap_ids)? {
        DigitSplit::Matches { indices, .. } => Ok(SplitOutcome::Eliminated(indices.into_iter().map(|index| pool[index].clone()).collect())),
        DigitSplit::NoMatch { significance } => Ok(SplitOutcome::NoMatch { significance }),
    }
}
