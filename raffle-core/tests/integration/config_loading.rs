use raffle_core::foundation::{RaffleError, RaffleId};
use raffle_core::infrastructure::config::{
    load_app_config, load_app_config_from_path, CONFIG_FILE_NAME, CONFIG_PATH_ENV, DATA_DIR_ENV, DEFAULT_POLL_INTERVAL_SECS,
};
use std::sync::{Mutex, MutexGuard, OnceLock};
use tempfile::TempDir;

fn lock_env() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    keys: Vec<&'static str>,
}

impl EnvGuard {
    fn set(pairs: &[(&'static str, &str)]) -> Self {
        for (key, value) in pairs {
            std::env::set_var(key, value);
        }
        Self { keys: pairs.iter().map(|(key, _)| *key).collect() }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            std::env::remove_var(key);
        }
    }
}

const TOML: &str = r#"
[oracle]
rpc_url = "https://mainnet.example.org/v3/secret"
retry_attempts = 4

[scheduler]
poll_interval_secs = 30
raffle_ids = [7, 8]
"#;

#[test]
fn test_load_when_env_override_present_then_env_wins_over_toml() {
    let _lock = lock_env();
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, TOML).expect("write config");
    let _env = EnvGuard::set(&[("RAFFLE_ORACLE__RPC_URL", "http://localhost:9545"), ("RAFFLE_SCHEDULER__POLL_INTERVAL_SECS", "5")]);

    let config = load_app_config_from_path(&path, dir.path()).expect("load");
    assert_eq!(config.oracle.rpc_url, "http://localhost:9545");
    assert_eq!(config.oracle.retry_attempts, 4);
    assert_eq!(config.scheduler.poll_interval_secs, 5);
    assert_eq!(config.scheduler.raffle_ids, vec![RaffleId::new(7), RaffleId::new(8)]);
    assert!(config.scheduler.stop_when_finalized);
    assert_eq!(config.service.data_dir, dir.path().to_string_lossy());
}

#[test]
fn test_load_when_located_through_env_then_data_dir_and_path_resolved() {
    let _lock = lock_env();
    let data_dir = TempDir::new().expect("tempdir");
    let config_dir = TempDir::new().expect("tempdir");
    let path = config_dir.path().join("custom.toml");
    std::fs::write(&path, TOML).expect("write config");
    let _env = EnvGuard::set(&[
        (DATA_DIR_ENV, data_dir.path().to_str().expect("utf8 path")),
        (CONFIG_PATH_ENV, path.to_str().expect("utf8 path")),
    ]);

    let config = load_app_config().expect("load");
    assert_eq!(config.scheduler.poll_interval_secs, 30);
    assert_eq!(config.service.data_dir, data_dir.path().to_string_lossy());
}

#[test]
fn test_load_when_file_missing_then_defaults_apply() {
    let _lock = lock_env();
    let dir = TempDir::new().expect("tempdir");
    let config = load_app_config_from_path(&dir.path().join(CONFIG_FILE_NAME), dir.path()).expect("defaults");
    assert_eq!(config.scheduler.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
    assert!(config.scheduler.raffle_ids.is_empty());
}

#[test]
fn test_load_when_values_invalid_then_config_error() {
    let _lock = lock_env();
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, TOML).expect("write config");
    let _env = EnvGuard::set(&[("RAFFLE_SCHEDULER__POLL_INTERVAL_SECS", "0")]);

    let err = load_app_config_from_path(&path, dir.path()).expect_err("invalid");
    assert!(matches!(&err, RaffleError::ConfigError(message) if message.contains("poll_interval_secs")));
}
