use log::{info, warn};
use raffle_core::application::RoundOrchestrator;
use raffle_core::foundation::{RaffleError, RaffleId};
use raffle_core::infrastructure::config::AppConfig;
use raffle_core::infrastructure::logging::init_logger;
use raffle_core::infrastructure::oracle::{redact_url, BlockOracle, JsonRpcBlockOracle};
use raffle_core::infrastructure::storage::{RocksStorage, Storage};
use std::sync::Arc;

const DEFAULT_LOG_FILTERS: &str = "info";

pub fn init_logging(app_config: &AppConfig, log_level: Option<&str>, log_dir: Option<&str>) -> Result<(), RaffleError> {
    let configured = app_config.logging.level.trim();
    let filters = match log_level {
        Some(level) => level,
        None if !configured.is_empty() => configured,
        None => DEFAULT_LOG_FILTERS,
    };
    let log_dir = log_dir.or(app_config.logging.log_dir.as_deref());
    init_logger(log_dir, filters)
}

pub fn load_app_config() -> Result<Arc<AppConfig>, RaffleError> {
    Ok(Arc::new(raffle_core::infrastructure::config::load_app_config()?))
}

pub fn init_storage(app_config: &AppConfig) -> Result<Arc<RocksStorage>, RaffleError> {
    let storage = RocksStorage::open_in_dir_with_options(&app_config.service.data_dir, app_config.service.allow_schema_wipe)?;
    if let Err(err) = storage.health_check() {
        warn!("storage health check failed error={}", err);
    }
    info!("storage initialized data_dir={}", app_config.service.data_dir);
    Ok(Arc::new(storage))
}

pub fn init_oracle(app_config: &AppConfig) -> Result<Arc<dyn BlockOracle>, RaffleError> {
    let oracle = JsonRpcBlockOracle::from_config(&app_config.oracle)?;
    info!(
        "block oracle ready rpc_url={} retry_attempts={} request_timeout_ms={}",
        redact_url(&app_config.oracle.rpc_url),
        app_config.oracle.retry_attempts,
        app_config.oracle.request_timeout_ms
    );
    Ok(Arc::new(oracle))
}

pub fn init_orchestrator(app_config: &AppConfig, storage: Arc<dyn Storage>) -> Result<Arc<RoundOrchestrator>, RaffleError> {
    Ok(Arc::new(RoundOrchestrator::new(storage, init_oracle(app_config)?)))
}

/// Configured raffles, or every unfinalized raffle in the store when none are configured.
pub fn raffles_to_drive(app_config: &AppConfig, storage: &dyn Storage) -> Result<Vec<RaffleId>, RaffleError> {
    if !app_config.scheduler.raffle_ids.is_empty() {
        return Ok(app_config.scheduler.raffle_ids.clone());
    }
    let raffle_ids = storage.list_raffles()?.into_iter().filter(|raffle| !raffle.finalized).map(|raffle| raffle.id).collect::<Vec<_>>();
    info!("no raffles configured; driving unfinalized raffles from store count={}", raffle_ids.len());
    Ok(raffle_ids)
}
