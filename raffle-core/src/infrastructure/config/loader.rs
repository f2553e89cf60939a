//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Environment variables (RAFFLE_* prefix)

use crate::foundation::RaffleError;
use crate::infrastructure::config::types::AppConfig;
use crate::infrastructure::oracle::redact_url;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::{debug, info};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "raffle-config.toml";

/// Environment variable prefix for config overrides.
///
/// Example: `RAFFLE_ORACLE__RPC_URL` -> `oracle.rpc_url`
const ENV_PREFIX: &str = "RAFFLE_";

/// Load configuration from the default file in `data_dir` (`raffle-config.toml`).
pub fn load_config(data_dir: &Path) -> Result<AppConfig, RaffleError> {
    load_config_from_file(&data_dir.join(CONFIG_FILE_NAME), data_dir)
}

/// Load configuration from a specific file path. A missing file means defaults plus env.
pub fn load_config_from_file(path: &Path, data_dir: &Path) -> Result<AppConfig, RaffleError> {
    info!("loading configuration path={} data_dir={}", path.display(), data_dir.display());
    let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("configuration file missing; using defaults and env only path={}", path.display());
    }
    // `RAFFLE_CONFIG_PATH` and `RAFFLE_DATA_DIR` locate the config; they are not config keys.
    let env = Env::prefixed(ENV_PREFIX).ignore(&["CONFIG_PATH", "DATA_DIR", "TEST_NOW_NANOS"]).split("__");
    let mut config: AppConfig =
        figment.merge(env).extract().map_err(|e| RaffleError::ConfigError(format!("config extraction failed: {e}")))?;
    postprocess(&mut config, data_dir);
    debug!(
        "configuration loaded rpc_url={} poll_interval_secs={} raffles={}",
        redact_url(&config.oracle.rpc_url),
        config.scheduler.poll_interval_secs,
        config.scheduler.raffle_ids.len()
    );
    Ok(config)
}

fn postprocess(config: &mut AppConfig, data_dir: &Path) {
    if config.service.data_dir.trim().is_empty() {
        config.service.data_dir = data_dir.to_string_lossy().to_string();
    }
    config.oracle.rpc_url = config.oracle.rpc_url.trim().to_string();
}
