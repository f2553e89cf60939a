//! RocksDB-backed storage engine.
//!
//! # Lock Semantics
//!
//! RocksDB itself is thread-safe, but writes that must check committed state first
//! (participant uniqueness, lazy results table creation, round commits) run under one
//! `write_lock`. Reads take no lock: a round is a single `WriteBatch`, so readers see
//! either all of it or none of it.
//!
//! The lock is acquired with a bounded timeout (`STORAGE_LOCK_TIMEOUT_SECS`).
//!
//! # Column Families
//!
//! See `schema.rs` for column family names and key layouts.

use crate::foundation::{PoapId, RaffleError, RaffleId};
use crate::infrastructure::storage::rocks::migration::open_db_with_cfs;
use crate::infrastructure::storage::rocks::schema::*;
use crate::storage_err;
use bincode::Options;
use log::{debug, info, warn};
use rocksdb::{checkpoint::Checkpoint, ColumnFamily, Direction, IteratorMode, DB};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::{env, fs};

mod batch;
mod storage;

pub const DB_DIR_NAME: &str = "raffle-ranking";
const SCHEMA_VERSION: u32 = 1;

pub struct RocksStorage {
    db: Arc<DB>,
    write_lock: Mutex<()>,
}

impl RocksStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RaffleError> {
        Self::open_with_options(path, false)
    }

    pub fn open_with_options(path: impl AsRef<Path>, allow_schema_wipe: bool) -> Result<Self, RaffleError> {
        let path = path.as_ref();
        debug!("opening RocksStorage path={}", path.display());
        let db = open_db_with_cfs(path)?;
        let storage = Self { db: Arc::new(db), write_lock: Mutex::new(()) };
        if let Err(err) = storage.maybe_run_migrations() {
            if allow_schema_wipe {
                if let RaffleError::SchemaMismatch { stored, current } = err {
                    warn!("schema mismatch (stored={}, current={}); wiping db path={}", stored, current, path.display());
                    drop(storage);
                    if path.exists() {
                        fs::remove_dir_all(path).map_err(|err| storage_err!("fs::remove_dir_all schema_wipe", err))?;
                    }
                    return Self::open_with_options(path, false);
                }
            }
            return Err(err);
        }
        info!("RocksStorage opened path={}", path.display());
        Ok(storage)
    }

    /// Opens under `RAFFLE_DATA_DIR`, else `./.raffle`.
    pub fn open_default() -> Result<Self, RaffleError> {
        if let Ok(data_dir) = env::var("RAFFLE_DATA_DIR") {
            let trimmed = data_dir.trim();
            if !trimmed.is_empty() {
                return Self::open_in_dir(trimmed);
            }
        }
        let base = env::current_dir().map_err(|err| storage_err!("env::current_dir", err))?;
        Self::open_in_dir(base.join(".raffle"))
    }

    pub fn open_in_dir(data_dir: impl AsRef<Path>) -> Result<Self, RaffleError> {
        Self::open_in_dir_with_options(data_dir, false)
    }

    pub fn open_in_dir_with_options(data_dir: impl AsRef<Path>, allow_schema_wipe: bool) -> Result<Self, RaffleError> {
        let dir = data_dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Self::open_default();
        }
        fs::create_dir_all(dir).map_err(|err| storage_err!("fs::create_dir_all open_in_dir", err))?;
        let path = dir.join(DB_DIR_NAME);
        debug!("opening RocksStorage in dir path={}", path.display());
        Self::open_with_options(path, allow_schema_wipe)
    }

    pub fn create_checkpoint(&self, path: impl AsRef<Path>) -> Result<(), RaffleError> {
        let path = path.as_ref();
        info!("creating RocksStorage checkpoint path={}", path.display());
        if path.exists() {
            let mut entries = fs::read_dir(path).map_err(|err| storage_err!("fs::read_dir checkpoint", err))?;
            if entries.next().is_some() {
                return Err(RaffleError::StorageError {
                    operation: "rocksdb checkpoint".to_string(),
                    details: format!("checkpoint directory is not empty: {}", path.display()),
                });
            }
            fs::remove_dir_all(path).map_err(|err| storage_err!("fs::remove_dir_all checkpoint", err))?;
        }
        let checkpoint = Checkpoint::new(&self.db).map_err(|err| storage_err!("rocksdb::Checkpoint::new", err))?;
        checkpoint.create_checkpoint(path).map_err(|err| storage_err!("rocksdb::create_checkpoint", err))?;
        info!("checkpoint created path={}", path.display());
        Ok(())
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily, RaffleError> {
        self.db.cf_handle(name).ok_or_else(|| RaffleError::StorageError {
            operation: "rocksdb cf_handle".to_string(),
            details: format!("missing column family: {}", name),
        })
    }

    fn maybe_run_migrations(&self) -> Result<(), RaffleError> {
        match self.schema_version()? {
            None => {
                info!("initializing fresh db schema schema_version={}", SCHEMA_VERSION);
                self.set_schema_version(SCHEMA_VERSION)?;
            }
            Some(v) if v == SCHEMA_VERSION => {}
            Some(v) => return Err(RaffleError::SchemaMismatch { stored: v, current: SCHEMA_VERSION }),
        }
        Ok(())
    }

    fn schema_version(&self) -> Result<Option<u32>, RaffleError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self.db.get_cf(cf, SCHEMA_VERSION_KEY) {
            Ok(Some(bytes)) => {
                let array: [u8; 4] = bytes.as_slice().try_into().map_err(|_| RaffleError::StorageError {
                    operation: "schema_version decode".to_string(),
                    details: "corrupt schema version".to_string(),
                })?;
                Ok(Some(u32::from_be_bytes(array)))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err!("rocksdb get_cf schema_version", e)),
        }
    }

    pub(crate) fn set_schema_version(&self, version: u32) -> Result<(), RaffleError> {
        let cf = self.cf_handle(CF_METADATA)?;
        self.db.put_cf(cf, SCHEMA_VERSION_KEY, version.to_be_bytes()).map_err(RaffleError::from)
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, RaffleError> {
        bincode::DefaultOptions::new().with_fixint_encoding().serialize(value).map_err(|err| err.into())
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, RaffleError> {
        bincode::DefaultOptions::new().with_fixint_encoding().deserialize(bytes).map_err(|err| err.into())
    }

    fn decode_order(bytes: &[u8]) -> Result<u64, RaffleError> {
        let array: [u8; 8] = bytes.try_into().map_err(|_| storage_err!("decode ranked order", "corrupt value"))?;
        Ok(u64::from_be_bytes(array))
    }

    fn key_raffle(raffle_id: &RaffleId) -> Vec<u8> {
        KeyBuilder::with_capacity(8).raffle(raffle_id).build()
    }

    fn key_raffle_poap(raffle_id: &RaffleId, poap_id: &PoapId) -> Vec<u8> {
        KeyBuilder::with_capacity(16).raffle(raffle_id).poap(poap_id).build()
    }

    fn key_raffle_order(raffle_id: &RaffleId, order: u64) -> Vec<u8> {
        KeyBuilder::with_capacity(16).raffle(raffle_id).u64_be(order).build()
    }

    fn get_value<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>, RaffleError> {
        let cf = self.cf_handle(cf_name)?;
        match self.db.get_cf(cf, key).map_err(|err| storage_err!("rocksdb get_cf", err))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn key_exists(&self, cf_name: &str, key: &[u8]) -> Result<bool, RaffleError> {
        let cf = self.cf_handle(cf_name)?;
        Ok(self.db.get_pinned_cf(cf, key).map_err(|err| storage_err!("rocksdb get_pinned_cf", err))?.is_some())
    }

    /// Values under `raffle_id` in key order.
    fn scan_raffle<T: serde::de::DeserializeOwned>(&self, cf_name: &str, raffle_id: &RaffleId) -> Result<Vec<T>, RaffleError> {
        let prefix = Self::key_raffle(raffle_id);
        let cf = self.cf_handle(cf_name)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::From(prefix.as_slice(), Direction::Forward)) {
            let (key, value) = item.map_err(|err| storage_err!("rocksdb iterator_cf", err))?;
            if !key.starts_with(&prefix) {
                break;
            }
            out.push(Self::decode(&value)?);
        }
        Ok(out)
    }

    /// Last value under `raffle_id` in key order.
    fn last_in_raffle<T: serde::de::DeserializeOwned>(&self, cf_name: &str, raffle_id: &RaffleId) -> Result<Option<T>, RaffleError> {
        let prefix = Self::key_raffle(raffle_id);
        let upper = Self::key_raffle_order(raffle_id, u64::MAX);
        let cf = self.cf_handle(cf_name)?;
        let mut iter = self.db.iterator_cf(cf, IteratorMode::From(upper.as_slice(), Direction::Reverse));
        match iter.next() {
            Some(item) => {
                let (key, value) = item.map_err(|err| storage_err!("rocksdb iterator_cf", err))?;
                if key.starts_with(&prefix) {
                    Ok(Some(Self::decode(&value)?))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }
}
