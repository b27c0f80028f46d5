//! # Outbound Ports (Driven Ports)
//!
//! The ordered key-value backend the store is built on.
//!
//! Production: `FileLogKVStore` (default) or `RocksDbStore` (feature `rocksdb`)
//! Testing: `InMemoryKVStore`

use crate::domain::{KVStoreError, Namespace};

/// One write in an atomic batch. The store is append-only, so puts are the
/// only operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOperation {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Returned by scan visitors to continue or end the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Stop,
}

/// Visitor invoked once per key/value pair, in scan order.
pub type ScanVisitor<'a> = dyn FnMut(&[u8], &[u8]) -> ScanControl + 'a;

/// Byte-ordered key-value store with one keyspace per `Namespace`.
///
/// Handles are shared by every writer, so all methods take `&self`.
pub trait OrderedKeyValueStore: Send + Sync {
    /// Apply every operation or none of them.
    fn write_batch(
        &self,
        namespace: Namespace,
        operations: Vec<BatchOperation>,
    ) -> Result<(), KVStoreError>;

    fn put(&self, namespace: Namespace, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.write_batch(namespace, vec![BatchOperation::put(key, value)])
    }

    /// Visit keys `>= from` in ascending order.
    fn scan_forward(
        &self,
        namespace: Namespace,
        from: &[u8],
        visitor: &mut ScanVisitor<'_>,
    ) -> Result<(), KVStoreError>;

    /// Visit every key in descending order, starting from the last.
    fn scan_reverse(
        &self,
        namespace: Namespace,
        visitor: &mut ScanVisitor<'_>,
    ) -> Result<(), KVStoreError>;

    fn is_read_only(&self) -> bool {
        false
    }

    /// Short backend name for logs.
    fn describe(&self) -> String;
}
