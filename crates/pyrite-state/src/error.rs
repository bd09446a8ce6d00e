//! Error types for the state machine and the block DAG.

use pyrite_consensus::{CodecError, ConsensusError, Hash};
use pyrite_storage::StorageError;
use thiserror::Error;

/// State transition errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Crediting the recipient would overflow its balance.
    #[error("`to` balance overflow")]
    ToBalanceOverflow,

    /// Crediting the miner's fee would overflow its balance.
    #[error("miner balance overflow")]
    MinerBalanceOverflow,

    /// `amount + fee` itself overflows.
    #[error("(amount + fee) overflow")]
    AmountPlusFeeOverflow,

    /// The sender cannot cover `amount + fee`.
    #[error("insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: u64, required: u64 },

    /// Transaction version not recognized by the state machine.
    #[error("unsupported transaction version: {0}")]
    UnsupportedTxVersion(u8),
}

/// Block DAG and replay errors.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The block references a parent this node has never seen.
    #[error("unknown parent block: {0}")]
    UnknownParent(Hash),

    /// The block hash is already in the store.
    #[error("duplicate block: {0}")]
    DuplicateBlock(Hash),

    /// A block required by the operation is absent.
    #[error("block not found: {0}")]
    BlockNotFound(Hash),

    /// A block row references an epoch row that is absent.
    #[error("epoch not found: {0}")]
    EpochNotFound(String),

    /// A body transaction failed signature verification.
    #[error("transaction {index}: invalid signature")]
    InvalidSignature { index: usize },

    /// A body transaction was rejected by the state machine's precheck.
    #[error("transaction {index} rejected by state machine")]
    TxVerifyFailed {
        index: usize,
        #[source]
        source: StateError,
    },

    /// A replayed transition failed; identifies the offending position.
    #[error("replay failed at block {block} tx {tx_index}")]
    Replay {
        block: Hash,
        tx_index: usize,
        #[source]
        source: StateError,
    },

    /// A consensus rule was violated.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A stored row failed to decode; the store is damaged.
    #[error("corrupt store: {0}")]
    Corrupt(String),
}

impl From<CodecError> for ChainError {
    fn from(err: CodecError) -> Self {
        // A row that round-tripped through our own codec can only fail
        // to parse if the backing store was damaged.
        ChainError::Corrupt(err.to_string())
    }
}

/// Result type for DAG operations.
pub type ChainResult<T> = Result<T, ChainError>;
