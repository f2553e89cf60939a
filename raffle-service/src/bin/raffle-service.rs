#[path = "raffle-service/cli.rs"]
mod cli;
#[path = "raffle-service/modes/mod.rs"]
mod modes;
#[path = "raffle-service/setup.rs"]
mod setup;

use crate::cli::{Cli, Command};
use log::info;
use raffle_core::infrastructure::storage::Storage;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    args.apply_to_env();

    let app_config = setup::load_app_config()?;
    setup::init_logging(&app_config, args.log_level.as_deref(), args.log_dir.as_deref())?;
    info!(
        "raffle-service starting command={:?} data_dir={} raffles_configured={}",
        args.command,
        app_config.service.data_dir,
        app_config.scheduler.raffle_ids.len()
    );

    let store: Arc<dyn Storage> = setup::init_storage(&app_config)?;

    match args.command {
        Command::Run => {
            let raffle_ids = setup::raffles_to_drive(&app_config, store.as_ref())?;
            let orchestrator = setup::init_orchestrator(&app_config, store)?;
            modes::run::run_scheduler(&app_config, orchestrator, raffle_ids).await?;
        }
        Command::Advance { raffle } => {
            let orchestrator = setup::init_orchestrator(&app_config, store)?;
            modes::advance::advance_once(&orchestrator, raffle).await?;
        }
        Command::Results { raffle } => modes::results::dump_results(raffle, store)?,
        Command::Import { file } => modes::import::import_from_json(&file, store.as_ref())?,
    }
    Ok(())
}
