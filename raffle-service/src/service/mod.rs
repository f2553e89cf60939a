pub mod metrics;
pub mod scheduler;

pub use metrics::{Metrics, MetricsSnapshot};
pub use scheduler::{DriveExit, DriveReport, Scheduler};
