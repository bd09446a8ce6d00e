//! Deterministic test fixtures: wallets, mined blocks, and chains.
//!
//! Everything here is reproducible run to run: wallets derive from fixed
//! seeds, signing is RFC 6979, and nonce grinding walks a counter, so a
//! given chain of inputs always produces the same hashes.

use num_bigint::BigUint;
use pyrite_consensus::{
    hash_to_biguint, retarget_difficulty, Block, RawBlock, RawTransaction,
};
use pyrite_mining::mine_block;
use pyrite_state::BlockDag;
use pyrite_wallet::Wallet;

/// A wallet derived from a one-byte seed. The same seed always yields
/// the same keypair.
pub fn seeded_wallet(seed: u8) -> Wallet {
    let mut secret = [0u8; 32];
    secret[31] = seed.wrapping_add(1);
    secret[0] = 0x01;
    Wallet::from_secret_hex(&hex::encode(secret)).expect("seeded secret is a valid scalar")
}

/// Mine a child of `parent` with the difficulty ingestion will demand:
/// the parent's epoch target, or the retargeted one on a boundary.
pub fn mine_child(
    dag: &BlockDag,
    parent: &Block,
    transactions: Vec<RawTransaction>,
    timestamp: u64,
) -> RawBlock {
    let config = dag.config();
    let parent_epoch = dag
        .epoch_for_block(&parent.hash)
        .expect("parent epoch exists");
    let height = parent.height + 1;
    let difficulty = if height % config.epoch_length_blocks == 0 {
        retarget_difficulty(&parent_epoch, timestamp, config.target_epoch_length_millis)
    } else {
        parent_epoch.difficulty
    };
    mine_block(parent, transactions, [0u8; 32], timestamp, &difficulty)
        .expect("solution within attempt budget")
}

/// Extend the full tip by `count` empty blocks at `interval_ms` spacing,
/// ingesting each. Returns the stored blocks, oldest first.
pub fn mine_chain(dag: &BlockDag, count: u64, interval_ms: u64) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(count as usize);
    let mut parent = dag.full_tip();
    for _ in 0..count {
        let timestamp = parent.timestamp + interval_ms;
        let raw = mine_child(dag, &parent, Vec::new(), timestamp);
        let block = dag.ingest_block(&raw).expect("mined block ingests");
        parent = block.clone();
        blocks.push(block);
    }
    blocks
}

/// Re-grind a block's nonce until its hash lands in `[lo, hi)`.
///
/// Validation tests tamper with header fields and then call this so the
/// tampered block still clears (or deliberately fails) the POW check;
/// fork tests use narrow windows to manufacture chains with bounded,
/// comparable work.
pub fn grind_nonce(block: &mut RawBlock, lo: &BigUint, hi: &BigUint) {
    for attempt in 0u64.. {
        block.nonce[24..32].copy_from_slice(&attempt.to_be_bytes());
        let value = hash_to_biguint(&block.hash());
        if *lo <= value && value < *hi {
            return;
        }
    }
    unreachable!("u64 nonce space exhausted");
}
