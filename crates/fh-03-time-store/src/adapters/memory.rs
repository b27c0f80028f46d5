use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::domain::{KVStoreError, Namespace};
use crate::ports::{BatchOperation, OrderedKeyValueStore, ScanControl, ScanVisitor};

type Keyspace = BTreeMap<Vec<u8>, Vec<u8>>;

/// In-memory store for unit tests and throwaway runs.
#[derive(Default)]
pub struct InMemoryKVStore {
    keyspaces: RwLock<[Keyspace; 4]>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, namespace: Namespace) -> usize {
        self.keyspaces.read()[namespace.index()].len()
    }
}

impl OrderedKeyValueStore for InMemoryKVStore {
    fn write_batch(
        &self,
        namespace: Namespace,
        operations: Vec<BatchOperation>,
    ) -> Result<(), KVStoreError> {
        let mut keyspaces = self.keyspaces.write();
        let keyspace = &mut keyspaces[namespace.index()];
        for op in operations {
            keyspace.insert(op.key, op.value);
        }
        Ok(())
    }

    fn scan_forward(
        &self,
        namespace: Namespace,
        from: &[u8],
        visitor: &mut ScanVisitor<'_>,
    ) -> Result<(), KVStoreError> {
        let keyspaces = self.keyspaces.read();
        for (key, value) in keyspaces[namespace.index()].range(from.to_vec()..) {
            if visitor(key, value) == ScanControl::Stop {
                break;
            }
        }
        Ok(())
    }

    fn scan_reverse(
        &self,
        namespace: Namespace,
        visitor: &mut ScanVisitor<'_>,
    ) -> Result<(), KVStoreError> {
        let keyspaces = self.keyspaces.read();
        for (key, value) in keyspaces[namespace.index()].iter().rev() {
            if visitor(key, value) == ScanControl::Stop {
                break;
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
