//! Application layer: orchestration across domain logic and infrastructure I/O.

pub mod committer;
pub mod import;
pub mod ledger_step;
pub mod orchestrator;
pub mod pool_resolver;
pub mod results;

pub use committer::{CommitReport, RoundCommitter};
pub use import::{import_raffle, ImportReport, ParticipantImport, RaffleImport};
pub use ledger_step::LedgerStepProvider;
pub use orchestrator::{RoundOrchestrator, RoundOutcome};
pub use pool_resolver::RemainingPoolResolver;
pub use results::{RaffleResults, RaffleStatus, RankedParticipant};
