//! Proof-of-work predicate and the work metric.
//!
//! Both interpret hashes as 256-bit big-endian unsigned integers; the
//! same convention applies everywhere a hash is compared to a target.

use crate::{ConsensusError, Hash};
use num_bigint::BigUint;
use num_traits::One;

/// A hash as a 256-bit unsigned integer.
pub fn hash_to_biguint(hash: &Hash) -> BigUint {
    BigUint::from_bytes_be(hash.as_bytes())
}

/// The work predicate: a solution is valid iff the hash is strictly
/// below the difficulty target.
pub fn verify_pow(hash: &Hash, difficulty: &BigUint) -> bool {
    hash_to_biguint(hash) < *difficulty
}

/// The scalar work contributed by one block: `2^256 / (hash + 1)`,
/// truncated. Lower hashes contribute more; summed along a chain this is
/// the tip-selection metric.
pub fn calculate_work(hash: &Hash) -> BigUint {
    let numerator = BigUint::one() << 256u32;
    numerator / (hash_to_biguint(hash) + BigUint::one())
}

/// Serialize a work quantity into the fixed 32-byte big-endian form used
/// on disk and in the `parent_total_work` header commitment.
///
/// Checked narrowing: a value that no longer fits 256 bits surfaces
/// [`ConsensusError::WorkOverflow`] instead of wrapping.
pub fn work_to_bytes32(work: &BigUint) -> Result<[u8; 32], ConsensusError> {
    let bytes = work.to_bytes_be();
    if bytes.len() > 32 {
        return Err(ConsensusError::WorkOverflow);
    }
    let mut buf = [0u8; 32];
    buf[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(buf)
}

/// Parse the fixed 32-byte big-endian work form.
pub fn work_from_bytes32(bytes: &[u8; 32]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}
