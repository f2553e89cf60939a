//! Domain layer: pure ranking model and algorithms (no I/O).

pub mod ledger;
pub mod model;
pub mod pool;
pub mod ranking;
pub mod split;

pub use ledger::{block_candidate, next_block_tag, BlockTag, LedgerStep, RawBlock};
pub use model::*;
pub use pool::{candidate_pool, remaining_pool};
pub use ranking::{assign_ranks, is_dense_ranking};
pub use split::{split_by_split_key, SplitOutcome};
