//! Candidate assembly and nonce grinding.

use crate::{MiningError, MiningResult};
use num_bigint::BigUint;
use pyrite_consensus::{
    hash_to_biguint, merkle_root, work_to_bytes32, Block, RawBlock, RawTransaction,
};
use tracing::debug;

/// Attempt budget for one solve call.
pub const MAX_SOLVE_ATTEMPTS: u64 = 1 << 26;

/// Assemble a child of `parent` and grind its nonce until the header
/// hash satisfies the difficulty target.
pub fn mine_block(
    parent: &Block,
    transactions: Vec<RawTransaction>,
    graffiti: [u8; 32],
    timestamp: u64,
    difficulty: &BigUint,
) -> MiningResult<RawBlock> {
    mine_block_with_bound(parent, transactions, graffiti, timestamp, difficulty)
}

/// Like [`mine_block`], but grind until the hash falls below an
/// arbitrary `bound`. A bound tighter than the difficulty target yields
/// a block with correspondingly more work; tests use this to construct
/// forks that outweigh longer chains.
pub fn mine_block_with_bound(
    parent: &Block,
    transactions: Vec<RawTransaction>,
    graffiti: [u8; 32],
    timestamp: u64,
    bound: &BigUint,
) -> MiningResult<RawBlock> {
    let envelopes: Vec<_> = transactions.iter().map(|tx| tx.envelope()).collect();
    let mut candidate = RawBlock {
        parent_hash: parent.hash,
        parent_total_work: work_to_bytes32(&parent.accumulated_work)?,
        timestamp,
        num_transactions: transactions.len() as u64,
        transactions_merkle_root: merkle_root(&envelopes),
        nonce: [0u8; 32],
        graffiti,
        transactions,
    };

    for attempt in 0..MAX_SOLVE_ATTEMPTS {
        candidate.nonce[24..32].copy_from_slice(&attempt.to_be_bytes());
        let hash = candidate.hash();
        if hash_to_biguint(&hash) < *bound {
            debug!(attempt, hash = %hash, "found solution");
            return Ok(candidate);
        }
    }

    Err(MiningError::NoSolution {
        attempts: MAX_SOLVE_ATTEMPTS,
    })
}
