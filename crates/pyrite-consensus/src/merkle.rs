//! Merkle tree over transaction envelopes.
//!
//! Leaves are the SHA-256 of each envelope; interior nodes hash the
//! concatenation of their children. A level with an odd node count
//! duplicates its last node. The root of the empty list is the all-zero
//! hash. Miner and verifier must agree on this function bit-exactly.

use crate::{sha256, Hash};

/// Compute the merkle root of a list of byte strings.
pub fn merkle_root<T: AsRef<[u8]>>(items: &[T]) -> Hash {
    if items.is_empty() {
        return Hash::zero();
    }

    let mut level: Vec<Hash> = items.iter().map(|item| sha256(item.as_ref())).collect();

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().expect("level is non-empty"));
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(pair[0].as_bytes());
                buf[32..].copy_from_slice(pair[1].as_bytes());
                sha256(&buf)
            })
            .collect();
    }

    level[0]
}
