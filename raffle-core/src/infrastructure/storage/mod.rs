pub use memory::MemoryStorage;
pub use rocks::RocksStorage;
pub use round::{RoundView, StagedRound};
pub use traits::*;
pub mod memory;
pub mod rocks;
pub mod round;
pub mod traits;
