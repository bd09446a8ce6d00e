//! Consensus configuration.
//!
//! [`ConsensusConfig`] is the constructor input of the block DAG: epoch
//! geometry, genesis difficulty, the block size limit, and the genesis
//! block itself. [`ConsensusConfigFile`] is its serde-facing mirror with
//! hex-encoded 256-bit fields, for nodes that load network parameters
//! from a config file.

use crate::{params, Hash, RawBlock};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Consensus parameters consumed by the block DAG.
#[derive(Clone, Debug)]
pub struct ConsensusConfig {
    /// Blocks per difficulty epoch; a new epoch begins at every height
    /// divisible by this.
    pub epoch_length_blocks: u64,
    /// Target duration of one full epoch, in milliseconds.
    pub target_epoch_length_millis: u64,
    /// Difficulty target of epoch zero.
    pub genesis_difficulty: BigUint,
    /// Maximum serialized block size accepted by ingestion.
    pub max_block_size_bytes: u64,
    /// The genesis block; inserted on first open.
    pub genesis_block: RawBlock,
}

impl ConsensusConfig {
    /// A small, fast-retargeting configuration for tests: easy genesis
    /// difficulty (2^250, ~64 hash attempts per block) and a fixed,
    /// transactionless genesis block.
    pub fn for_tests(epoch_length_blocks: u64, target_epoch_length_millis: u64) -> Self {
        Self {
            epoch_length_blocks,
            target_epoch_length_millis,
            genesis_difficulty: BigUint::from(1u8) << 250u32,
            max_block_size_bytes: params::MAX_BLOCK_SIZE_BYTES,
            genesis_block: genesis_block(0, [0u8; 32], *b"pyrite-test-genesis-graffiti----"),
        }
    }
}

/// Build a genesis block: zero parent, zero work commitment, no body.
pub fn genesis_block(timestamp: u64, nonce: [u8; 32], graffiti: [u8; 32]) -> RawBlock {
    RawBlock {
        parent_hash: Hash::zero(),
        parent_total_work: [0u8; 32],
        timestamp,
        num_transactions: 0,
        transactions_merkle_root: Hash::zero(),
        nonce,
        graffiti,
        transactions: Vec::new(),
    }
}

/// Configuration errors raised when loading network parameters.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid hex in field `{field}`")]
    InvalidHex { field: &'static str },

    #[error("field `{field}` must be {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("field `{field}` must be non-zero")]
    ZeroValue { field: &'static str },
}

/// File-facing mirror of [`ConsensusConfig`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsensusConfigFile {
    pub epoch_length_blocks: u64,
    pub target_epoch_length_millis: u64,
    /// Hex-encoded difficulty target of epoch zero.
    pub genesis_difficulty: String,
    pub max_block_size_bytes: u64,
    pub genesis: GenesisFile,
}

/// Genesis block parameters as they appear in a config file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisFile {
    pub timestamp: u64,
    /// Hex-encoded 32-byte nonce.
    pub nonce: String,
    /// Hex-encoded 32-byte graffiti.
    pub graffiti: String,
}

impl ConsensusConfigFile {
    /// Validate and convert into the runtime configuration.
    pub fn into_config(self) -> Result<ConsensusConfig, ConfigError> {
        if self.epoch_length_blocks == 0 {
            return Err(ConfigError::ZeroValue {
                field: "epoch_length_blocks",
            });
        }
        if self.target_epoch_length_millis == 0 {
            return Err(ConfigError::ZeroValue {
                field: "target_epoch_length_millis",
            });
        }

        let genesis_difficulty = BigUint::parse_bytes(self.genesis_difficulty.as_bytes(), 16)
            .ok_or(ConfigError::InvalidHex {
                field: "genesis_difficulty",
            })?;
        if genesis_difficulty.is_zero() {
            return Err(ConfigError::ZeroValue {
                field: "genesis_difficulty",
            });
        }

        let nonce = decode_bytes32(&self.genesis.nonce, "genesis.nonce")?;
        let graffiti = decode_bytes32(&self.genesis.graffiti, "genesis.graffiti")?;

        Ok(ConsensusConfig {
            epoch_length_blocks: self.epoch_length_blocks,
            target_epoch_length_millis: self.target_epoch_length_millis,
            genesis_difficulty,
            max_block_size_bytes: self.max_block_size_bytes,
            genesis_block: genesis_block(self.genesis.timestamp, nonce, graffiti),
        })
    }
}

fn decode_bytes32(s: &str, field: &'static str) -> Result<[u8; 32], ConfigError> {
    let bytes = hex::decode(s).map_err(|_| ConfigError::InvalidHex { field })?;
    bytes.try_into().map_err(|v: Vec<u8>| ConfigError::InvalidLength {
        field,
        expected: 32,
        actual: v.len(),
    })
}
