//! Epoch tests: boundary creation, inheritance, and retargeting.

use crate::harness::TestNode;
use pyrite_consensus::verify_pow;

#[test]
fn test_blocks_inherit_parent_epoch_until_boundary() {
    let node = TestNode::open_default(); // epoch length 4
    let genesis = node.dag.full_tip();
    let genesis_epoch = node.dag.epoch_for_block(&genesis.hash).unwrap();

    let blocks = crate::generators::mine_chain(&node.dag, 3, 5_000);
    for block in &blocks {
        assert_eq!(block.epoch_id, genesis_epoch.id());
    }
}

#[test]
fn test_half_target_epoch_halves_difficulty() {
    // Epoch length 4, target 40s. Four blocks at 5s spacing finish the
    // epoch in 20s, half the target, so the difficulty must halve.
    let node = TestNode::open_default();
    let genesis_difficulty = node.dag.config().genesis_difficulty.clone();

    let blocks = crate::generators::mine_chain(&node.dag, 4, 5_000);
    let boundary = &blocks[3];
    assert_eq!(boundary.height, 4);

    let epoch = node.dag.epoch_for_block(&boundary.hash).unwrap();
    assert_eq!(epoch.number, 1);
    assert_eq!(epoch.start_height, 4);
    assert_eq!(epoch.start_block_hash, boundary.hash);
    assert_eq!(epoch.start_time, boundary.timestamp);
    assert_eq!(epoch.difficulty, &genesis_difficulty / 2u32);
    assert_eq!(boundary.epoch_id, epoch.id());

    // The boundary block itself satisfied the retargeted target.
    assert!(verify_pow(&boundary.hash, &epoch.difficulty));
}

#[test]
fn test_double_target_epoch_doubles_difficulty() {
    let node = TestNode::open_default();
    let genesis_difficulty = node.dag.config().genesis_difficulty.clone();

    // Four blocks at 20s spacing: 80s elapsed against a 40s target.
    let blocks = crate::generators::mine_chain(&node.dag, 4, 20_000);
    let epoch = node.dag.epoch_for_block(&blocks[3].hash).unwrap();
    assert_eq!(epoch.difficulty, &genesis_difficulty * 2u32);
}

#[test]
fn test_second_retarget_compounds() {
    let node = TestNode::open_default();
    let genesis_difficulty = node.dag.config().genesis_difficulty.clone();

    // Both epochs finish in half the target time.
    crate::generators::mine_chain(&node.dag, 4, 5_000);
    let blocks = crate::generators::mine_chain(&node.dag, 4, 5_000);
    let boundary = &blocks[3];
    assert_eq!(boundary.height, 8);

    let epoch = node.dag.epoch_for_block(&boundary.hash).unwrap();
    assert_eq!(epoch.number, 2);
    assert_eq!(epoch.start_height, 8);
    assert_eq!(epoch.difficulty, &genesis_difficulty / 4u32);
}

#[test]
fn test_epoch_numbers_follow_height() {
    let node = TestNode::open_default();
    let blocks = crate::generators::mine_chain(&node.dag, 9, 5_000);

    for block in &blocks {
        let epoch = node.dag.epoch_for_block(&block.hash).unwrap();
        assert_eq!(epoch.number, block.height / 4);
        assert_eq!(epoch.start_height % 4, 0);
        // Every block satisfies its own epoch's target.
        assert!(verify_pow(&block.hash, &epoch.difficulty));
    }
}

#[test]
fn test_stalled_epoch_clamps_at_four_x() {
    let node = TestNode::open_default();
    let genesis_difficulty = node.dag.config().genesis_difficulty.clone();

    // 100s spacing: 400s elapsed against 40s target, clamped to 4x.
    let blocks = crate::generators::mine_chain(&node.dag, 4, 100_000);
    let epoch = node.dag.epoch_for_block(&blocks[3].hash).unwrap();
    assert_eq!(epoch.difficulty, &genesis_difficulty * 4u32);
}
