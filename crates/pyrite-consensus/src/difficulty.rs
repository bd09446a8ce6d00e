//! Epoch-boundary difficulty retargeting.
//!
//! At every height divisible by the epoch length, the difficulty is
//! rescaled by the ratio of the previous epoch's elapsed wall time to
//! the configured target duration:
//!
//! ```text
//! new = prev * clamp(elapsed_ms, target/4, target*4) / target
//! ```
//!
//! Elapsed time of zero is substituted with one millisecond, and the
//! result floors at one, so a target can neither divide by zero nor
//! collapse to an unsatisfiable zero difficulty.

use crate::params::MAX_RETARGET_FACTOR;
use crate::{ConsensusConfig, Epoch, Hash};
use num_bigint::BigUint;
use num_traits::One;
use tracing::debug;

/// Compute the difficulty for the epoch following `prev`, given the
/// timestamp of the boundary block.
pub fn retarget_difficulty(
    prev: &Epoch,
    boundary_timestamp: u64,
    target_epoch_length_millis: u64,
) -> BigUint {
    let target_ms = target_epoch_length_millis.max(1);
    let elapsed_ms = boundary_timestamp.saturating_sub(prev.start_time).max(1);

    let lo = (target_ms / MAX_RETARGET_FACTOR).max(1);
    let hi = target_ms.saturating_mul(MAX_RETARGET_FACTOR).max(lo);
    let clamped_ms = elapsed_ms.clamp(lo, hi);

    let scaled = &prev.difficulty * BigUint::from(clamped_ms) / BigUint::from(target_ms);
    let next = scaled.max(BigUint::one());

    debug!(
        epoch = prev.number,
        elapsed_ms,
        clamped_ms,
        target_ms,
        prev_difficulty = %prev.difficulty,
        next_difficulty = %next,
        "retargeted difficulty"
    );
    next
}

/// Build the epoch that begins at `height` with `block_hash` as its
/// first block. The caller guarantees `height` is an epoch boundary.
pub fn next_epoch(
    prev: &Epoch,
    block_hash: Hash,
    block_timestamp: u64,
    height: u64,
    config: &ConsensusConfig,
) -> Epoch {
    Epoch {
        number: height / config.epoch_length_blocks,
        start_block_hash: block_hash,
        start_time: block_timestamp,
        start_height: height,
        difficulty: retarget_difficulty(prev, block_timestamp, config.target_epoch_length_millis),
    }
}
