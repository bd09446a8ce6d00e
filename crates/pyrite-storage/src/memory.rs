//! In-memory [`Storage`] implementation for tests.

use crate::batch::BatchOp;
use crate::{ColumnFamily, Storage, StorageResult, WriteBatch};
use parking_lot::RwLock;
use std::collections::BTreeMap;

type Table = BTreeMap<Vec<u8>, Vec<u8>>;

/// A `Storage` backed by ordered in-memory maps.
///
/// Matches the on-disk backend's semantics (atomic batches, ascending key
/// iteration) without touching the filesystem.
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<BTreeMap<&'static str, Table>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, cf: ColumnFamily, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self
            .tables
            .read()
            .get(cf.name())
            .and_then(|t| t.get(key).cloned()))
    }

    fn put(&self, cf: ColumnFamily, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.tables
            .write()
            .entry(cf.name())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, cf: ColumnFamily, key: &[u8]) -> StorageResult<()> {
        if let Some(table) = self.tables.write().get_mut(cf.name()) {
            table.remove(key);
        }
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()> {
        // The whole batch lands under one write lock.
        let mut tables = self.tables.write();
        for op in batch.ops {
            match op {
                BatchOp::Put { cf, key, value } => {
                    tables.entry(cf.name()).or_default().insert(key, value);
                }
                BatchOp::Delete { cf, key } => {
                    if let Some(table) = tables.get_mut(cf.name()) {
                        table.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }

    fn iter(
        &self,
        cf: ColumnFamily,
    ) -> StorageResult<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_>> {
        let rows: Vec<_> = self
            .tables
            .read()
            .get(cf.name())
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        Ok(Box::new(rows.into_iter()))
    }
}
