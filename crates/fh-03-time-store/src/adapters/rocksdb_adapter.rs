//! # RocksDB Store
//!
//! One column family per namespace. A batch is one `WriteBatch`, so a
//! leaderboard snapshot lands atomically.

use std::path::{Path, PathBuf};

use rocksdb::{
    BlockBasedOptions, ColumnFamily, ColumnFamilyDescriptor, DBCompressionType, Direction,
    IteratorMode, Options, WriteBatch, WriteOptions, DB,
};

use crate::domain::{KVStoreError, Namespace};
use crate::ports::{BatchOperation, OrderedKeyValueStore, ScanControl, ScanVisitor};

#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    pub path: PathBuf,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// fsync after each batch
    pub sync_writes: bool,
    pub read_only: bool,
}

impl RocksDbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 64 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: false,
            read_only: false,
        }
    }
}

pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbStore {
    pub fn open(config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(!config.read_only);
        opts.create_missing_column_families(!config.read_only);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(DBCompressionType::Snappy);

        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let names = Namespace::ALL.map(|ns| ns.as_str());

        let db = if config.read_only {
            if !config.path.is_dir() {
                return Err(KVStoreError::NotFound(config.path.clone()));
            }
            DB::open_cf_for_read_only(&opts, &config.path, names, false)
        } else {
            let descriptors: Vec<ColumnFamilyDescriptor> = names
                .iter()
                .map(|name| {
                    let mut cf_opts = Options::default();
                    cf_opts.set_compression_type(DBCompressionType::Snappy);
                    ColumnFamilyDescriptor::new(*name, cf_opts)
                })
                .collect();
            DB::open_cf_descriptors(&opts, &config.path, descriptors)
        }
        .map_err(|e| KVStoreError::io("open RocksDB", e))?;

        Ok(Self { db, config })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn cf(&self, namespace: Namespace) -> Result<&ColumnFamily, KVStoreError> {
        self.db
            .cf_handle(namespace.as_str())
            .ok_or_else(|| KVStoreError::Corruption {
                message: format!("missing column family {}", namespace),
            })
    }

    fn visit(
        &self,
        namespace: Namespace,
        mode: IteratorMode<'_>,
        visitor: &mut ScanVisitor<'_>,
    ) -> Result<(), KVStoreError> {
        let cf = self.cf(namespace)?;
        for item in self.db.iterator_cf(cf, mode) {
            let (key, value) = item.map_err(|e| KVStoreError::io("RocksDB scan", e))?;
            if visitor(&key, &value) == ScanControl::Stop {
                break;
            }
        }
        Ok(())
    }
}

impl OrderedKeyValueStore for RocksDbStore {
    fn write_batch(
        &self,
        namespace: Namespace,
        operations: Vec<BatchOperation>,
    ) -> Result<(), KVStoreError> {
        if self.config.read_only {
            return Err(KVStoreError::ReadOnly);
        }
        let cf = self.cf(namespace)?;
        let mut batch = WriteBatch::default();
        for op in operations {
            batch.put_cf(cf, &op.key, &op.value);
        }

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        self.db
            .write_opt(batch, &write_opts)
            .map_err(|e| KVStoreError::io("RocksDB batch write", e))
    }

    fn scan_forward(
        &self,
        namespace: Namespace,
        from: &[u8],
        visitor: &mut ScanVisitor<'_>,
    ) -> Result<(), KVStoreError> {
        self.visit(namespace, IteratorMode::From(from, Direction::Forward), visitor)
    }

    fn scan_reverse(
        &self,
        namespace: Namespace,
        visitor: &mut ScanVisitor<'_>,
    ) -> Result<(), KVStoreError> {
        self.visit(namespace, IteratorMode::End, visitor)
    }

    fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    fn describe(&self) -> String {
        format!("rocksdb:{}", self.config.path.display())
    }
}
