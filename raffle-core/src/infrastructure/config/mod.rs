mod loader;
mod types;
pub mod validation;

pub use loader::{load_config, load_config_from_file, CONFIG_FILE_NAME};
pub use types::*;

use crate::foundation::RaffleError;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "RAFFLE_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "RAFFLE_DATA_DIR";

/// Resolve, load and validate the configuration.
pub fn load_app_config() -> Result<AppConfig, RaffleError> {
    let data_dir = resolve_data_dir()?;
    let config_path = resolve_config_path(&data_dir)?;
    load_app_config_from_path(&config_path, &data_dir)
}

pub fn load_app_config_from_path(path: &Path, data_dir: &Path) -> Result<AppConfig, RaffleError> {
    let config = load_config_from_file(path, data_dir)?;
    config.validate().map_err(|errors| RaffleError::ConfigError(format!("validation failed: {:?}", errors)))?;
    Ok(config)
}

pub fn resolve_config_path(data_dir: &Path) -> Result<PathBuf, RaffleError> {
    if let Some(path) = non_empty_env(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(data_dir.join(CONFIG_FILE_NAME))
}

pub fn resolve_data_dir() -> Result<PathBuf, RaffleError> {
    if let Some(data_dir) = non_empty_env(DATA_DIR_ENV) {
        return Ok(PathBuf::from(data_dir));
    }
    let cwd = std::env::current_dir()
        .map_err(|err| RaffleError::StorageError { operation: "env::current_dir".to_string(), details: err.to_string() })?;
    Ok(cwd.join(".raffle"))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
