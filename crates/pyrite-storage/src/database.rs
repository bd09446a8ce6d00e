//! RocksDB database implementation.

use crate::batch::BatchOp;
use crate::{Storage, StorageError, StorageResult, WriteBatch};
use rocksdb::{ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded, Options};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Column families holding the block DAG schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnFamily {
    /// Enriched block rows indexed by block hash.
    Blocks,
    /// Difficulty epoch rows indexed by epoch id.
    Epochs,
    /// Wire-encoded transactions indexed by txid.
    Transactions,
    /// txid per (block hash, txindex); the ordered block/tx join.
    BlockTransactions,
    /// Parent-hash index: (parent hash, child hash) -> ().
    Children,
    /// Singleton keys: chain tips, schema version.
    Metadata,
    /// Default column family (required by RocksDB).
    Default,
}

impl ColumnFamily {
    /// String name of the column family.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnFamily::Blocks => "blocks",
            ColumnFamily::Epochs => "epochs",
            ColumnFamily::Transactions => "transactions",
            ColumnFamily::BlockTransactions => "block_transactions",
            ColumnFamily::Children => "children",
            ColumnFamily::Metadata => "metadata",
            ColumnFamily::Default => "default",
        }
    }

    /// All column families, in creation order.
    pub fn all() -> &'static [ColumnFamily] {
        &[
            ColumnFamily::Blocks,
            ColumnFamily::Epochs,
            ColumnFamily::Transactions,
            ColumnFamily::BlockTransactions,
            ColumnFamily::Children,
            ColumnFamily::Metadata,
            ColumnFamily::Default,
        ]
    }
}

/// RocksDB-backed [`Storage`] implementation.
pub struct Database {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        info!(?path, "opening database");

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(256);
        opts.set_keep_log_file_num(1);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ColumnFamily::all()
            .iter()
            .map(|cf| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
                ColumnFamilyDescriptor::new(cf.name(), cf_opts)
            })
            .collect();

        let db =
            DBWithThreadMode::<MultiThreaded>::open_cf_descriptors(&opts, path, cf_descriptors)?;

        debug!("database opened");
        Ok(Self { db: Arc::new(db) })
    }

    fn handle(&self, cf: ColumnFamily) -> StorageResult<Arc<rocksdb::BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(cf.name())
            .ok_or(StorageError::ColumnFamilyNotFound(cf.name()))
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> StorageResult<()> {
        for cf in ColumnFamily::all() {
            if let Some(handle) = self.db.cf_handle(cf.name()) {
                self.db.flush_cf(&handle)?;
            }
        }
        Ok(())
    }
}

impl Storage for Database {
    fn get(&self, cf: ColumnFamily, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let handle = self.handle(cf)?;
        Ok(self.db.get_cf(&handle, key)?)
    }

    fn put(&self, cf: ColumnFamily, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let handle = self.handle(cf)?;
        self.db.put_cf(&handle, key, value)?;
        Ok(())
    }

    fn delete(&self, cf: ColumnFamily, key: &[u8]) -> StorageResult<()> {
        let handle = self.handle(cf)?;
        self.db.delete_cf(&handle, key)?;
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()> {
        let mut rocks_batch = rocksdb::WriteBatch::default();
        for op in batch.ops {
            match op {
                BatchOp::Put { cf, key, value } => {
                    let handle = self.handle(cf)?;
                    rocks_batch.put_cf(&handle, &key, &value);
                }
                BatchOp::Delete { cf, key } => {
                    let handle = self.handle(cf)?;
                    rocks_batch.delete_cf(&handle, &key);
                }
            }
        }
        self.db.write(rocks_batch)?;
        Ok(())
    }

    fn iter(
        &self,
        cf: ColumnFamily,
    ) -> StorageResult<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_>> {
        let handle = self.handle(cf)?;
        let collected: Vec<_> = self
            .db
            .iterator_cf(&handle, IteratorMode::Start)
            .filter_map(|r| r.ok())
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();
        Ok(Box::new(collected.into_iter()))
    }

    fn iter_prefix(
        &self,
        cf: ColumnFamily,
        prefix: &[u8],
    ) -> StorageResult<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + '_>> {
        let handle = self.handle(cf)?;
        let prefix = prefix.to_vec();
        let collected: Vec<_> = self
            .db
            .iterator_cf(
                &handle,
                IteratorMode::From(&prefix, rocksdb::Direction::Forward),
            )
            .filter_map(|r| r.ok())
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();
        Ok(Box::new(collected.into_iter()))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}
