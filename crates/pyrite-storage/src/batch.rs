//! Write batch: the atomic commit unit.
//!
//! Block ingestion stages every row it produces (block, epoch,
//! transactions, join rows, tip metadata) into one batch, so a failed
//! verification never leaves partial state behind.

use crate::ColumnFamily;

/// A single staged write.
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Put a key-value pair.
    Put {
        cf: ColumnFamily,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete { cf: ColumnFamily, key: Vec<u8> },
}

/// An ordered list of writes committed atomically.
#[derive(Debug, Default)]
pub struct WriteBatch {
    pub(crate) ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(capacity),
        }
    }

    /// Stage a put.
    pub fn put(&mut self, cf: ColumnFamily, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Put {
            cf,
            key: key.into(),
            value: value.into(),
        });
    }

    /// Stage a delete.
    pub fn delete(&mut self, cf: ColumnFamily, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete { cf, key: key.into() });
    }

    /// Number of staged operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch has no staged operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append all operations from `other`, preserving order.
    pub fn merge(&mut self, other: WriteBatch) {
        self.ops.extend(other.ops);
    }
}
