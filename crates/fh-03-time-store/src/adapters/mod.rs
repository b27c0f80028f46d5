//! Backends for `OrderedKeyValueStore`, plus backend selection.

pub mod file_log;
pub mod lock;
pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::StoreError;
use crate::ports::OrderedKeyValueStore;

pub use file_log::{FileLogKVStore, FileLogOptions};
pub use lock::StoreLock;
pub use memory::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    File,
    RocksDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "rocksdb" => Ok(StoreBackend::RocksDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(StoreError::InvalidConfig(format!(
                "unknown store backend '{other}' (expected file, rocksdb or memory)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub backend: StoreBackend,
    pub sync_writes: bool,
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/firehose"),
            backend: StoreBackend::File,
            sync_writes: false,
            read_only: false,
        }
    }
}

/// Open the configured backend.
pub fn open_backend(config: &StoreConfig) -> Result<Arc<dyn OrderedKeyValueStore>, StoreError> {
    match config.backend {
        StoreBackend::File => {
            let options = FileLogOptions {
                read_only: config.read_only,
                sync_writes: config.sync_writes,
            };
            Ok(Arc::new(FileLogKVStore::open(&config.path, options)?))
        }
        StoreBackend::Memory => Ok(Arc::new(InMemoryKVStore::new())),
        #[cfg(feature = "rocksdb")]
        StoreBackend::RocksDb => {
            let rocks = RocksDbConfig {
                sync_writes: config.sync_writes,
                read_only: config.read_only,
                ..RocksDbConfig::new(&config.path)
            };
            Ok(Arc::new(RocksDbStore::open(rocks)?))
        }
        #[cfg(not(feature = "rocksdb"))]
        StoreBackend::RocksDb => Err(StoreError::Backend(crate::domain::KVStoreError::Io {
            message: "built without the `rocksdb` feature".to_string(),
        })),
    }
}
