//! # pyrite-consensus
//!
//! Consensus rules for the pyrite blockchain.
//!
//! This crate provides:
//! - Canonical byte codecs for transactions and blocks, with SHA-256
//!   identities (double-hash for transactions)
//! - The proof-of-work predicate and the per-block work metric
//! - Difficulty epochs and the epoch-boundary retarget
//! - The consensus configuration consumed by the block DAG
//!
//! ## Proof-of-work
//!
//! A block hash interpreted as a 256-bit big-endian integer must be
//! strictly below the difficulty target of the block's epoch. Chain
//! selection weighs blocks by `2^256 / (hash + 1)`, summed from genesis.
//!
//! ## Difficulty epochs
//!
//! Every `epoch_length_blocks` blocks a new epoch begins: the difficulty
//! is rescaled by the ratio of the previous epoch's elapsed time to the
//! configured target, clamped to a 4x swing per retarget.

mod block;
mod config;
mod difficulty;
mod error;
mod hash;
mod merkle;
mod pow;
mod tx;

pub use block::{Block, Epoch, RawBlock, BLOCK_HEADER_BYTES};
pub use config::{genesis_block, ConfigError, ConsensusConfig, ConsensusConfigFile, GenesisFile};
pub use difficulty::{next_epoch, retarget_difficulty};
pub use error::{CodecError, ConsensusError, ConsensusResult};
pub use hash::{sha256, sha256d, Hash};
pub use merkle::merkle_root;
pub use pow::{calculate_work, hash_to_biguint, verify_pow, work_from_bytes32, work_to_bytes32};
pub use tx::{RawTransaction, TX_ENVELOPE_BYTES, TX_VERSION, TX_WIRE_BYTES};

/// Default network parameters.
pub mod params {
    /// Default difficulty epoch length in blocks.
    pub const EPOCH_LENGTH_BLOCKS: u64 = 2016;

    /// Default target duration of one full epoch in milliseconds
    /// (ten-minute blocks).
    pub const TARGET_EPOCH_LENGTH_MILLIS: u64 = 2016 * 10 * 60 * 1000;

    /// Default maximum block size in bytes.
    pub const MAX_BLOCK_SIZE_BYTES: u64 = 1_048_576; // 1MB

    /// Maximum difficulty adjustment factor per retarget.
    pub const MAX_RETARGET_FACTOR: u64 = 4;
}
