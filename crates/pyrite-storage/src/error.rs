//! Error types for the storage layer.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend I/O failure surfaced by RocksDB.
    #[error("database error: {0}")]
    Database(#[from] rocksdb::Error),

    /// A row that callers require to exist was absent.
    #[error("key not found")]
    KeyNotFound,

    /// A stored row violated an integrity constraint on read.
    #[error("data corruption detected: {0}")]
    Corruption(String),

    /// Column family missing from an opened database.
    #[error("column family not found: {0}")]
    ColumnFamilyNotFound(&'static str),

    /// Filesystem-level I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
