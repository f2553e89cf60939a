//! Infrastructure layer: I/O and external integrations.

pub mod config;
pub mod logging;
pub mod oracle;
pub mod storage;
