//! Sanity tests: genesis initialization, basic ingestion, restarts.

use crate::generators::mine_child;
use crate::harness::TestNode;
use num_bigint::BigUint;
use parking_lot::Mutex;
use pyrite_consensus::{calculate_work, Hash};
use pyrite_storage::{ColumnFamily, Storage};
use std::sync::Arc;

#[test]
fn test_fresh_store_holds_only_genesis() {
    let mut config = pyrite_consensus::ConsensusConfig::for_tests(4, 40_000);
    config.genesis_difficulty = BigUint::from(1u8) << 240u32;
    let node = TestNode::open(config);
    let genesis_hash = node.dag.config().genesis_block.hash();

    // Exactly one block row and one epoch row.
    let blocks: Vec<_> = node.storage.iter(ColumnFamily::Blocks).unwrap().collect();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].0, genesis_hash.as_bytes().to_vec());
    let epochs: Vec<_> = node.storage.iter(ColumnFamily::Epochs).unwrap().collect();
    assert_eq!(epochs.len(), 1);

    let genesis = node.dag.block_by_hash(&genesis_hash).unwrap().unwrap();
    assert_eq!(genesis.height, 0);
    assert_eq!(genesis.parent_hash, Hash::zero());
    assert_eq!(genesis.parent_total_work, BigUint::from(0u32));
    assert_eq!(genesis.accumulated_work, calculate_work(&genesis_hash));

    // Epoch zero starts at genesis with the configured difficulty.
    let epoch = node.dag.epoch_for_block(&genesis_hash).unwrap();
    assert_eq!(epoch.number, 0);
    assert_eq!(epoch.start_height, 0);
    assert_eq!(epoch.start_block_hash, genesis_hash);
    assert_eq!(epoch.difficulty, BigUint::from(1u8) << 240u32);
    assert_eq!(epoch.id(), format!("0_{}", genesis_hash.to_hex()));

    // Both tips point at genesis.
    assert_eq!(node.dag.headers_tip().hash, genesis_hash);
    assert_eq!(node.dag.full_tip().hash, genesis_hash);
}

#[test]
fn test_single_valid_child() {
    let node = TestNode::open_default();
    let genesis = node.dag.full_tip();

    let events: Arc<Mutex<Vec<(Hash, Hash)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    node.dag
        .set_on_new_full_tip(move |new, prev| sink.lock().push((new.hash, prev.hash)));

    let raw = mine_child(&node.dag, &genesis, Vec::new(), 10_000);
    let b1 = node.dag.ingest_block(&raw).unwrap();

    assert_eq!(node.dag.headers_tip().height, 1);
    assert_eq!(node.dag.full_tip().hash, b1.hash);
    assert_eq!(
        b1.accumulated_work,
        &genesis.accumulated_work + calculate_work(&b1.hash)
    );
    // The hook observed exactly one change: genesis -> b1.
    assert_eq!(events.lock().as_slice(), &[(b1.hash, genesis.hash)]);
}

#[test]
fn test_restart_preserves_tips_and_rows() {
    let node = TestNode::open_default();
    let genesis = node.dag.full_tip();
    let b1 = node
        .dag
        .ingest_block(&mine_child(&node.dag, &genesis, Vec::new(), 10_000))
        .unwrap();
    let b2 = node
        .dag
        .ingest_block(&mine_child(&node.dag, &b1, Vec::new(), 20_000))
        .unwrap();

    let node = node.reopen();
    assert_eq!(node.dag.headers_tip().hash, b2.hash);
    assert_eq!(node.dag.full_tip().hash, b2.hash);
    assert_eq!(node.dag.block_by_hash(&b1.hash).unwrap().unwrap(), b1);
    assert_eq!(
        node.dag.chain_hash_list(&b2.hash, 10).unwrap(),
        vec![genesis.hash, b1.hash, b2.hash]
    );
}

#[test]
fn test_heights_and_parent_work_chain_invariants() {
    let node = TestNode::open_default();
    let blocks = crate::generators::mine_chain(&node.dag, 3, 5_000);

    let mut parent = node
        .dag
        .block_by_hash(&node.dag.config().genesis_block.hash())
        .unwrap()
        .unwrap();
    for block in blocks {
        assert_eq!(block.height, parent.height + 1);
        // The stored commitment equals the parent's accumulated work.
        assert_eq!(block.parent_total_work, parent.accumulated_work);
        // Accumulated work adds exactly this block's work.
        assert_eq!(
            block.accumulated_work,
            &parent.accumulated_work + calculate_work(&block.hash)
        );
        parent = block;
    }
}
