//! # pyrite-storage
//!
//! Storage layer for the pyrite node.
//!
//! The block DAG persists through a small transactional key-value
//! abstraction: a [`Storage`] trait with per-concern column families and
//! atomic [`WriteBatch`] commits. The production backend is RocksDB; tests
//! can substitute an in-memory implementation through the trait.
//!
//! ## Column families
//!
//! - `Blocks`: enriched block rows indexed by block hash
//! - `Epochs`: difficulty epoch rows indexed by epoch id
//! - `Transactions`: wire-encoded transactions indexed by txid
//! - `BlockTransactions`: txid per (block hash, txindex), the ordered
//!   block-to-transaction join
//! - `Children`: parent-hash index over blocks
//! - `Metadata`: chain tips and other singleton keys

mod batch;
mod database;
mod error;
mod memory;

pub use batch::WriteBatch;
pub use database::{ColumnFamily, Database};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;

/// Transactional key-value store under the block DAG.
///
/// A `WriteBatch` is the unit of atomicity: every row staged in a batch
/// becomes visible together or not at all. Readers never observe a
/// partially applied batch.
pub trait Storage: Send + Sync {
    /// Get a value by key from a column family.
    fn get(&self, cf: ColumnFamily, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Put a single key-value pair into a column family.
    fn put(&self, cf: ColumnFamily, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Delete a key from a column family.
    fn delete(&self, cf: ColumnFamily, key: &[u8]) -> StorageResult<()>;

    /// Check whether a key exists in a column family.
    fn contains(&self, cf: ColumnFamily, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(cf, key)?.is_some())
    }

    /// Commit a batch of writes atomically.
    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()>;

    /// Iterate a column family in ascending key order.
    fn iter(&self, cf: ColumnFamily)
        -> StorageResult<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_>>;

    /// Iterate the keys of a column family that start with `prefix`,
    /// in ascending key order.
    fn iter_prefix(
        &self,
        cf: ColumnFamily,
        prefix: &[u8],
    ) -> StorageResult<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_>> {
        let prefix = prefix.to_vec();
        Ok(Box::new(self.iter(cf)?.filter(move |(k, _)| k.starts_with(&prefix))))
    }

    /// Get multiple values by key from a column family.
    fn multi_get(&self, cf: ColumnFamily, keys: &[&[u8]]) -> StorageResult<Vec<Option<Vec<u8>>>> {
        keys.iter().map(|k| self.get(cf, k)).collect()
    }
}
