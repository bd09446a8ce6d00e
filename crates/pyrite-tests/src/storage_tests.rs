//! Storage tests: row layout, join ordering, and duplicate handling,
//! inspected at the column-family level.

use crate::generators::{mine_child, seeded_wallet};
use crate::harness::TestNode;
use pyrite_consensus::{Block, Epoch};
use pyrite_storage::{ColumnFamily, Storage};
use pyrite_wallet::{build_coinbase, build_transfer};

#[test]
fn test_ingested_block_rows() {
    let node = TestNode::open_default();
    let genesis = node.dag.full_tip();

    let miner = seeded_wallet(1);
    let user = seeded_wallet(2);
    let coinbase = build_coinbase(&miner, miner.pubkey_bytes(), 100);
    let transfer = build_transfer(&miner, user.pubkey_bytes(), 10, 1, 0);
    let raw = mine_child(&node.dag, &genesis, vec![coinbase, transfer], 10_000);
    let block = node.dag.ingest_block(&raw).unwrap();

    // Block row decodes back to the stored block.
    let row = node
        .storage
        .get(ColumnFamily::Blocks, block.hash.as_bytes())
        .unwrap()
        .expect("block row exists");
    assert_eq!(Block::decode_row(&row).unwrap(), block);

    // Both transactions landed, keyed by txid, as 219-byte wire bytes.
    for tx in [&coinbase, &transfer] {
        let stored = node
            .storage
            .get(ColumnFamily::Transactions, tx.txid().as_bytes())
            .unwrap()
            .expect("transaction row exists");
        assert_eq!(stored, tx.to_bytes().to_vec());
    }

    // Join rows map (block, txindex) to txids in order.
    let mut key0 = block.hash.as_bytes().to_vec();
    key0.extend_from_slice(&0u64.to_be_bytes());
    let mut key1 = block.hash.as_bytes().to_vec();
    key1.extend_from_slice(&1u64.to_be_bytes());
    assert_eq!(
        node.storage
            .get(ColumnFamily::BlockTransactions, &key0)
            .unwrap(),
        Some(coinbase.txid().as_bytes().to_vec())
    );
    assert_eq!(
        node.storage
            .get(ColumnFamily::BlockTransactions, &key1)
            .unwrap(),
        Some(transfer.txid().as_bytes().to_vec())
    );

    // Tip metadata points at the new block.
    assert_eq!(
        node.storage
            .get(ColumnFamily::Metadata, b"headers_tip")
            .unwrap(),
        Some(block.hash.as_bytes().to_vec())
    );
    assert_eq!(
        node.storage.get(ColumnFamily::Metadata, b"full_tip").unwrap(),
        Some(block.hash.as_bytes().to_vec())
    );
}

#[test]
fn test_block_transactions_preserve_txindex_order() {
    let node = TestNode::open_default();
    let genesis = node.dag.full_tip();

    let miner = seeded_wallet(1);
    let user = seeded_wallet(2);
    let txs = vec![
        build_coinbase(&miner, miner.pubkey_bytes(), 300),
        build_transfer(&miner, user.pubkey_bytes(), 1, 0, 0),
        build_transfer(&miner, user.pubkey_bytes(), 2, 0, 1),
        build_transfer(&miner, user.pubkey_bytes(), 3, 0, 2),
    ];
    let raw = mine_child(&node.dag, &genesis, txs.clone(), 10_000);
    let block = node.dag.ingest_block(&raw).unwrap();

    let stored = node.dag.block_transactions(&block.hash).unwrap();
    assert_eq!(stored, txs);
}

#[test]
fn test_known_transaction_reinserted_as_skip() {
    let node = TestNode::open_default();
    let genesis = node.dag.full_tip();

    let miner = seeded_wallet(1);
    // The identical coinbase envelope appears in two blocks: one
    // transaction row, two join rows.
    let coinbase = build_coinbase(&miner, miner.pubkey_bytes(), 100);
    let b1 = node
        .dag
        .ingest_block(&mine_child(&node.dag, &genesis, vec![coinbase], 10_000))
        .unwrap();
    let b2 = node
        .dag
        .ingest_block(&mine_child(&node.dag, &b1, vec![coinbase], 20_000))
        .unwrap();

    let tx_rows: Vec<_> = node
        .storage
        .iter(ColumnFamily::Transactions)
        .unwrap()
        .collect();
    assert_eq!(tx_rows.len(), 1);

    assert_eq!(node.dag.block_transactions(&b1.hash).unwrap(), vec![coinbase]);
    assert_eq!(node.dag.block_transactions(&b2.hash).unwrap(), vec![coinbase]);
}

#[test]
fn test_epoch_rows_accumulate_per_boundary() {
    let node = TestNode::open_default(); // epoch length 4
    crate::generators::mine_chain(&node.dag, 8, 5_000);

    let epochs: Vec<Epoch> = node
        .storage
        .iter(ColumnFamily::Epochs)
        .unwrap()
        .map(|(_, row)| Epoch::decode_row(&row).unwrap())
        .collect();
    // Genesis epoch plus boundaries at heights 4 and 8.
    assert_eq!(epochs.len(), 3);
    let mut numbers: Vec<u64> = epochs.iter().map(|e| e.number).collect();
    numbers.sort();
    assert_eq!(numbers, vec![0, 1, 2]);
    for epoch in &epochs {
        assert_eq!(epoch.start_height, epoch.number * 4);
    }
}

#[test]
fn test_header_row_gains_size_after_body() {
    let node = TestNode::open_default();
    let genesis = node.dag.full_tip();

    let miner = seeded_wallet(1);
    let coinbase = build_coinbase(&miner, miner.pubkey_bytes(), 100);
    let raw = mine_child(&node.dag, &genesis, vec![coinbase], 10_000);

    node.dag.ingest_header(&raw).unwrap();
    let header_only = node.dag.block_by_hash(&raw.hash()).unwrap().unwrap();
    assert_eq!(header_only.size_bytes, 0);

    node.dag.ingest_block_body(&raw.hash(), &[coinbase]).unwrap();
    let full = node.dag.block_by_hash(&raw.hash()).unwrap().unwrap();
    assert_eq!(full.size_bytes, raw.size_bytes());
    assert_eq!(full.size_bytes, 176 + 219);
}

#[test]
fn test_raw_block_data_roundtrips_through_wire_codec() {
    let node = TestNode::open_default();
    let genesis = node.dag.full_tip();

    let miner = seeded_wallet(1);
    let coinbase = build_coinbase(&miner, miner.pubkey_bytes(), 100);
    let raw = mine_child(&node.dag, &genesis, vec![coinbase], 10_000);
    node.dag.ingest_block(&raw).unwrap();

    let data = node.dag.raw_block_data(&raw.hash()).unwrap();
    let decoded = pyrite_consensus::RawBlock::from_bytes(&data).unwrap();
    assert_eq!(decoded, raw);
    assert_eq!(decoded.hash(), raw.hash());
}

#[test]
fn test_children_index_tracks_parent_edges() {
    let node = TestNode::open_default();
    let genesis = node.dag.full_tip();
    let blocks = crate::generators::mine_chain(&node.dag, 2, 5_000);

    assert_eq!(node.dag.children(&genesis.hash).unwrap(), vec![blocks[0].hash]);
    assert_eq!(
        node.dag.children(&blocks[0].hash).unwrap(),
        vec![blocks[1].hash]
    );
    assert!(node.dag.children(&blocks[1].hash).unwrap().is_empty());
}
