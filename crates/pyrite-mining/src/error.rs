//! Error types for mining.

use pyrite_consensus::ConsensusError;
use thiserror::Error;

/// Mining errors.
#[derive(Error, Debug)]
pub enum MiningError {
    /// The attempt budget ran out before a solution was found.
    #[error("no solution within {attempts} attempts")]
    NoSolution { attempts: u64 },

    /// The parent work commitment could not be encoded.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),
}

/// Result type for mining operations.
pub type MiningResult<T> = Result<T, MiningError>;
