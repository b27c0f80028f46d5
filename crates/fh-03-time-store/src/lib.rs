//! # Time Store (fh-03)
//!
//! Persists closed windows under keys whose byte order is time order, and
//! answers range and most-recent queries over them.
//!
//! ## Key Layout
//!
//! ```text
//! 0637372799400000000           counts, retweets
//! 0637372799400000000rustlang   mentions, hashtags
//! └──── 19 digits ────┘└ entity
//! ```
//!
//! Negative times are rejected at encode time.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Namespaces, key and payload encoding, summary, errors
//! - `ports/` - `OrderedKeyValueStore`
//! - `adapters/` - In-memory, file-log, and RocksDB (feature `rocksdb`) backends
//! - `service/` - `TimeIndexedStore` queries and the `StoreWriters` group

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    open_backend, FileLogKVStore, FileLogOptions, InMemoryKVStore, StoreBackend, StoreConfig,
};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStore};
pub use domain::{KVStoreError, Namespace, StoreError, StoreSummary};
pub use ports::{BatchOperation, OrderedKeyValueStore, ScanControl};
pub use service::{StoreWriters, StoredEntry, TimeIndexedStore};
