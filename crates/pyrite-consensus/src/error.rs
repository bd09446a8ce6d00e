//! Error types for consensus validation and the wire codecs.

use crate::Hash;
use num_bigint::BigUint;
use thiserror::Error;

/// Wire and row codec errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A fixed-size encoding had the wrong length.
    #[error("unexpected length: expected {expected} bytes, got {actual}")]
    UnexpectedLength { expected: usize, actual: usize },

    /// Input ended before a field could be read.
    #[error("truncated input: needed {needed} more bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A length-prefixed field exceeded its bound.
    #[error("field too long: {length} bytes, max {max}")]
    FieldTooLong { length: usize, max: usize },

    /// A declared count disagreed with the encoded payload.
    #[error("inconsistent count: declared {declared}, payload holds {actual}")]
    InconsistentCount { declared: u64, actual: u64 },

    /// Invalid UTF-8 in a text field.
    #[error("invalid utf-8 in {field}")]
    InvalidUtf8 { field: &'static str },
}

/// Consensus validation errors.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// Proof-of-work solution does not meet the epoch's target.
    #[error("invalid proof-of-work: hash {hash} not below target")]
    InvalidPow { hash: Hash },

    /// The block's parent-work commitment disagrees with the stored parent.
    #[error("invalid parent total work: expected {expected}, got {actual}")]
    InvalidParentTotalWork { expected: BigUint, actual: BigUint },

    /// The recomputed transaction merkle root disagrees with the header.
    #[error("invalid merkle root: expected {expected}, got {actual}")]
    InvalidMerkleRoot { expected: Hash, actual: Hash },

    /// Header transaction count disagrees with the body.
    #[error("transaction count mismatch: header declares {declared}, body holds {actual}")]
    NumTransactionsMismatch { declared: u64, actual: u64 },

    /// Block exceeds the configured maximum size.
    #[error("block too large: {size} bytes, max {max}")]
    BlockTooLarge { size: u64, max: u64 },

    /// Transaction version not recognized by this node.
    #[error("unsupported transaction version: {0}")]
    UnsupportedTxVersion(u8),

    /// Accumulated work no longer fits a 32-byte commitment.
    #[error("accumulated work exceeds 256 bits")]
    WorkOverflow,

    /// Malformed wire or row encoding.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
