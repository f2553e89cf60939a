use super::schema::*;
use crate::foundation::RaffleError;
use rocksdb::{ColumnFamilyDescriptor, Options as RocksOptions, DB};
use std::path::Path;

pub fn open_db_with_cfs(path: impl AsRef<Path>) -> Result<DB, RaffleError> {
    let mut options = RocksOptions::default();
    options.create_if_missing(true);
    options.create_missing_column_families(true);
    options.set_use_fsync(true);
    options.set_manual_wal_flush(false);
    options.set_paranoid_checks(true);

    let cfs = [CF_DEFAULT, CF_METADATA, CF_RAFFLE, CF_PARTICIPANT, CF_RESULTS_TABLE, CF_RESULTS_ENTRY, CF_RANKED, CF_BLOCK_DATA]
        .into_iter()
        .map(|name| ColumnFamilyDescriptor::new(name, RocksOptions::default()))
        .collect::<Vec<_>>();

    DB::open_cf_descriptors(&options, path, cfs)
        .map_err(|err| RaffleError::StorageError { operation: "rocksdb open_cf_descriptors".to_string(), details: err.to_string() })
}
