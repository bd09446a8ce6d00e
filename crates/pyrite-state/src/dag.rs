//! The persistent block DAG.
//!
//! Blocks form a DAG keyed by hash, with parent edges as stored
//! references rather than owned pointers. Ingestion verifies a raw block
//! against its parent and difficulty epoch, then persists every produced
//! row — block, optional epoch, transactions, join rows, tip metadata —
//! in one atomic batch. The heaviest-accumulated-work block is the tip;
//! ties keep the earlier insertion.
//!
//! Two tips are tracked: the headers tip (heaviest chain of headers,
//! SPV view) and the full tip (heaviest chain of blocks whose bodies
//! are stored). Both are instance fields, updated strictly after the
//! contributing block's batch commits.

use crate::{ChainError, ChainResult, TxVerifier};
use num_bigint::BigUint;
use parking_lot::RwLock;
use pyrite_consensus::{
    calculate_work, merkle_root, next_epoch, verify_pow, work_from_bytes32, work_to_bytes32,
    Block, ConsensusConfig, ConsensusError, Epoch, Hash, RawBlock, RawTransaction,
    BLOCK_HEADER_BYTES, TX_VERSION, TX_WIRE_BYTES,
};
use pyrite_storage::{ColumnFamily, Storage, WriteBatch};
use pyrite_wallet::verify_signature;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Single-slot observer invoked as `(new_tip, previous_tip)` after a tip
/// change commits.
pub type TipHook = Box<dyn Fn(&Block, &Block) + Send + Sync>;

const HEADERS_TIP_KEY: &[u8] = b"headers_tip";
const FULL_TIP_KEY: &[u8] = b"full_tip";
const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Bumped when the row layout changes incompatibly.
const SCHEMA_VERSION: u8 = 1;

/// Key into `BlockTransactions`: block hash then txindex, big-endian so
/// ascending key order is ascending txindex.
fn tx_block_key(block_hash: &Hash, index: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(40);
    key.extend_from_slice(block_hash.as_bytes());
    key.extend_from_slice(&index.to_be_bytes());
    key
}

/// Key into `Children`: parent hash then child hash.
fn child_key(parent: &Hash, child: &Hash) -> Vec<u8> {
    let mut key = Vec::with_capacity(64);
    key.extend_from_slice(parent.as_bytes());
    key.extend_from_slice(child.as_bytes());
    key
}

/// One tracked tip: its persisted metadata key, the cached block, and
/// an optional observer hook.
struct TipSlot {
    key: &'static [u8],
    label: &'static str,
    block: RwLock<Block>,
    hook: RwLock<Option<TipHook>>,
}

impl TipSlot {
    fn new(key: &'static [u8], label: &'static str, block: Block) -> Self {
        Self {
            key,
            label,
            block: RwLock::new(block),
            hook: RwLock::new(None),
        }
    }

    fn current(&self) -> Block {
        self.block.read().clone()
    }

    /// Stage the metadata update if `candidate` carries strictly more
    /// work than the current tip. Strict comparison keeps the earlier
    /// insertion on ties. Returns the displaced tip.
    fn stage_if_heavier(&self, batch: &mut WriteBatch, candidate: &Block) -> Option<Block> {
        let prev = self.block.read().clone();
        if candidate.accumulated_work > prev.accumulated_work {
            batch.put(
                ColumnFamily::Metadata,
                self.key.to_vec(),
                candidate.hash.as_bytes().to_vec(),
            );
            Some(prev)
        } else {
            None
        }
    }

    /// Swap the cached tip and notify the observer. Called only after
    /// the staged batch committed.
    fn finalize(&self, candidate: &Block, prev: Block) {
        *self.block.write() = candidate.clone();
        info!(
            height = candidate.height,
            hash = %candidate.hash,
            acc_work = %candidate.accumulated_work,
            "new {} tip",
            self.label
        );
        if let Some(hook) = self.hook.read().as_ref() {
            hook(candidate, &prev);
        }
    }
}

/// The block DAG: verification, persistence, and tip selection.
pub struct BlockDag {
    storage: Arc<dyn Storage>,
    verifier: Arc<dyn TxVerifier>,
    config: ConsensusConfig,
    headers_tip: TipSlot,
    full_tip: TipSlot,
}

impl BlockDag {
    /// Open the DAG, inserting the genesis block, its epoch, and the
    /// initial tips on first use.
    pub fn open(
        storage: Arc<dyn Storage>,
        verifier: Arc<dyn TxVerifier>,
        config: ConsensusConfig,
    ) -> ChainResult<Self> {
        match storage.get(ColumnFamily::Metadata, SCHEMA_VERSION_KEY)? {
            Some(version) if version != [SCHEMA_VERSION] => {
                return Err(ChainError::Corrupt(format!(
                    "unsupported schema version {:?}, expected {}",
                    version, SCHEMA_VERSION
                )));
            }
            _ => {}
        }

        let genesis_hash = config.genesis_block.hash();
        if !storage.contains(ColumnFamily::Blocks, genesis_hash.as_bytes())? {
            Self::init_genesis(storage.as_ref(), &config)?;
        }

        let headers_tip = Self::load_tip(storage.as_ref(), HEADERS_TIP_KEY)?;
        let full_tip = Self::load_tip(storage.as_ref(), FULL_TIP_KEY)?;
        debug!(
            headers_tip = %headers_tip.hash,
            full_tip = %full_tip.hash,
            "block DAG opened"
        );

        Ok(Self {
            storage,
            verifier,
            config,
            headers_tip: TipSlot::new(HEADERS_TIP_KEY, "headers", headers_tip),
            full_tip: TipSlot::new(FULL_TIP_KEY, "full", full_tip),
        })
    }

    fn init_genesis(storage: &dyn Storage, config: &ConsensusConfig) -> ChainResult<()> {
        let raw = &config.genesis_block;
        let hash = raw.hash();
        let epoch = Epoch {
            number: 0,
            start_block_hash: hash,
            start_time: raw.timestamp,
            start_height: 0,
            difficulty: config.genesis_difficulty.clone(),
        };
        let work = calculate_work(&hash);
        let block = Block::from_raw(raw, 0, epoch.id(), raw.size_bytes(), work);

        let mut batch = WriteBatch::new();
        batch.put(
            ColumnFamily::Epochs,
            epoch.id().into_bytes(),
            epoch.encode_row()?,
        );
        batch.put(
            ColumnFamily::Blocks,
            hash.as_bytes().to_vec(),
            block.encode_row()?,
        );
        batch.put(
            ColumnFamily::Metadata,
            HEADERS_TIP_KEY.to_vec(),
            hash.as_bytes().to_vec(),
        );
        batch.put(
            ColumnFamily::Metadata,
            FULL_TIP_KEY.to_vec(),
            hash.as_bytes().to_vec(),
        );
        batch.put(
            ColumnFamily::Metadata,
            SCHEMA_VERSION_KEY.to_vec(),
            vec![SCHEMA_VERSION],
        );
        storage.write_batch(batch)?;

        info!(
            hash = %hash,
            difficulty = %config.genesis_difficulty,
            acc_work = %block.accumulated_work,
            "initialized block DAG with genesis"
        );
        Ok(())
    }

    fn load_tip(storage: &dyn Storage, key: &[u8]) -> ChainResult<Block> {
        let bytes = storage
            .get(ColumnFamily::Metadata, key)?
            .ok_or_else(|| ChainError::Corrupt(format!("missing tip metadata {:?}", key)))?;
        let hash_bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ChainError::Corrupt("tip metadata is not a 32-byte hash".into()))?;
        let hash = Hash::from_bytes(hash_bytes);
        let row = storage
            .get(ColumnFamily::Blocks, hash.as_bytes())?
            .ok_or_else(|| ChainError::Corrupt(format!("tip {hash} has no block row")))?;
        Ok(Block::decode_row(&row)?)
    }

    /// The consensus configuration this DAG was opened with.
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    // ==================== Tips & observers ====================

    /// Tip of the heaviest chain of headers.
    pub fn headers_tip(&self) -> Block {
        self.headers_tip.current()
    }

    /// Tip of the heaviest chain of full blocks.
    pub fn full_tip(&self) -> Block {
        self.full_tip.current()
    }

    /// Install the headers-tip observer, replacing any previous one.
    pub fn set_on_new_headers_tip(&self, hook: impl Fn(&Block, &Block) + Send + Sync + 'static) {
        *self.headers_tip.hook.write() = Some(Box::new(hook));
    }

    /// Install the full-tip observer, replacing any previous one.
    pub fn set_on_new_full_tip(&self, hook: impl Fn(&Block, &Block) + Send + Sync + 'static) {
        *self.full_tip.hook.write() = Some(Box::new(hook));
    }

    // ==================== Queries ====================

    /// Look up a block row by hash.
    pub fn block_by_hash(&self, hash: &Hash) -> ChainResult<Option<Block>> {
        match self.storage.get(ColumnFamily::Blocks, hash.as_bytes())? {
            Some(bytes) => Ok(Some(Block::decode_row(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Whether a block row exists.
    pub fn has_block(&self, hash: &Hash) -> ChainResult<bool> {
        Ok(self
            .storage
            .contains(ColumnFamily::Blocks, hash.as_bytes())?)
    }

    /// Look up an epoch row by id.
    pub fn epoch_by_id(&self, id: &str) -> ChainResult<Option<Epoch>> {
        match self.storage.get(ColumnFamily::Epochs, id.as_bytes())? {
            Some(bytes) => Ok(Some(Epoch::decode_row(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Resolve a block's epoch through its row's epoch id.
    pub fn epoch_for_block(&self, hash: &Hash) -> ChainResult<Epoch> {
        let block = self
            .block_by_hash(hash)?
            .ok_or(ChainError::BlockNotFound(*hash))?;
        self.epoch_by_id(&block.epoch_id)?
            .ok_or(ChainError::EpochNotFound(block.epoch_id))
    }

    /// A block's transactions in txindex order.
    pub fn block_transactions(&self, hash: &Hash) -> ChainResult<Vec<RawTransaction>> {
        let block = self
            .block_by_hash(hash)?
            .ok_or(ChainError::BlockNotFound(*hash))?;

        let mut txs = Vec::with_capacity(block.num_transactions as usize);
        for index in 0..block.num_transactions {
            let txid = self
                .storage
                .get(ColumnFamily::BlockTransactions, &tx_block_key(hash, index))?
                .ok_or_else(|| {
                    ChainError::Corrupt(format!("block {hash} missing txindex {index}"))
                })?;
            let bytes = self
                .storage
                .get(ColumnFamily::Transactions, &txid)?
                .ok_or_else(|| {
                    ChainError::Corrupt(format!(
                        "transaction {} referenced but not stored",
                        hex::encode(&txid)
                    ))
                })?;
            txs.push(RawTransaction::from_bytes(&bytes)?);
        }
        Ok(txs)
    }

    /// Hashes of a block's direct children, via the parent index.
    pub fn children(&self, hash: &Hash) -> ChainResult<Vec<Hash>> {
        let mut children = Vec::new();
        for (key, _) in self
            .storage
            .iter_prefix(ColumnFamily::Children, hash.as_bytes())?
        {
            let child: [u8; 32] = key[32..]
                .try_into()
                .map_err(|_| ChainError::Corrupt("malformed child index key".into()))?;
            children.push(Hash::from_bytes(child));
        }
        Ok(children)
    }

    /// Reassemble the full wire encoding of a stored block from its row
    /// and transaction set, for serving to peers.
    pub fn raw_block_data(&self, hash: &Hash) -> ChainResult<Vec<u8>> {
        let block = self
            .block_by_hash(hash)?
            .ok_or(ChainError::BlockNotFound(*hash))?;
        let transactions = self.block_transactions(hash)?;
        let raw = RawBlock {
            parent_hash: block.parent_hash,
            parent_total_work: work_to_bytes32(&block.parent_total_work)?,
            timestamp: block.timestamp,
            num_transactions: block.num_transactions,
            transactions_merkle_root: block.transactions_merkle_root,
            nonce: block.nonce,
            graffiti: block.graffiti,
            transactions,
        };
        Ok(raw.to_bytes())
    }

    /// Walk parents from `start`, collecting up to `depth` hashes, and
    /// return them oldest-first. A missing start hash yields an empty
    /// list; reaching genesis stops the walk.
    pub fn chain_hash_list(&self, start: &Hash, depth: u64) -> ChainResult<Vec<Hash>> {
        let mut list = Vec::new();
        let mut cursor = *start;
        while (list.len() as u64) < depth {
            let Some(block) = self.block_by_hash(&cursor)? else {
                break;
            };
            list.push(block.hash);
            if block.height == 0 {
                break;
            }
            cursor = block.parent_hash;
        }
        list.reverse();
        Ok(list)
    }

    // ==================== Ingestion ====================

    /// Ingest a block header (SPV path): full consensus checks, no body.
    /// The block row is persisted with `size_bytes = 0` until the body
    /// arrives through [`BlockDag::ingest_block_body`].
    #[instrument(skip(self, raw), fields(hash = %raw.hash()))]
    pub fn ingest_header(&self, raw: &RawBlock) -> ChainResult<Block> {
        let mut batch = WriteBatch::new();
        let block = self.verify_header(raw, &mut batch)?;
        self.stage_block(&mut batch, &block)?;

        let displaced = self.headers_tip.stage_if_heavier(&mut batch, &block);
        self.storage.write_batch(batch)?;
        if let Some(prev) = displaced {
            self.headers_tip.finalize(&block, prev);
        }
        Ok(block)
    }

    /// Ingest the body of a previously ingested header: verifies the
    /// transaction set against the header's commitments, persists it,
    /// and refreshes the full tip.
    #[instrument(skip(self, body), fields(hash = %hash, transactions = body.len()))]
    pub fn ingest_block_body(&self, hash: &Hash, body: &[RawTransaction]) -> ChainResult<Block> {
        let block = self
            .block_by_hash(hash)?
            .ok_or(ChainError::BlockNotFound(*hash))?;

        if block.num_transactions != body.len() as u64 {
            return Err(ConsensusError::NumTransactionsMismatch {
                declared: block.num_transactions,
                actual: body.len() as u64,
            }
            .into());
        }
        self.verify_body(&block.transactions_merkle_root, body)?;

        let size_bytes = BLOCK_HEADER_BYTES as u64 + TX_WIRE_BYTES as u64 * body.len() as u64;
        if size_bytes > self.config.max_block_size_bytes {
            return Err(ConsensusError::BlockTooLarge {
                size: size_bytes,
                max: self.config.max_block_size_bytes,
            }
            .into());
        }

        let mut batch = WriteBatch::new();
        self.stage_body(&mut batch, hash, body)?;
        let mut updated = block;
        updated.size_bytes = size_bytes;
        batch.put(
            ColumnFamily::Blocks,
            hash.as_bytes().to_vec(),
            updated.encode_row()?,
        );

        let displaced = self.full_tip.stage_if_heavier(&mut batch, &updated);
        self.storage.write_batch(batch)?;
        if let Some(prev) = displaced {
            self.full_tip.finalize(&updated, prev);
        }
        Ok(updated)
    }

    /// Ingest a full block: the union of header and body verification,
    /// one atomic commit, then both tip updates.
    #[instrument(skip(self, raw), fields(hash = %raw.hash(), transactions = raw.transactions.len()))]
    pub fn ingest_block(&self, raw: &RawBlock) -> ChainResult<Block> {
        // Header checks first: they are cheap and stage at most an
        // epoch row, which is discarded with the batch on any failure.
        let mut batch = WriteBatch::new();
        let mut block = self.verify_header(raw, &mut batch)?;

        if raw.num_transactions != raw.transactions.len() as u64 {
            return Err(ConsensusError::NumTransactionsMismatch {
                declared: raw.num_transactions,
                actual: raw.transactions.len() as u64,
            }
            .into());
        }
        self.verify_body(&raw.transactions_merkle_root, &raw.transactions)?;

        let size_bytes = raw.size_bytes();
        if size_bytes > self.config.max_block_size_bytes {
            return Err(ConsensusError::BlockTooLarge {
                size: size_bytes,
                max: self.config.max_block_size_bytes,
            }
            .into());
        }

        block.size_bytes = size_bytes;
        self.stage_block(&mut batch, &block)?;
        self.stage_body(&mut batch, &block.hash, &raw.transactions)?;

        let headers_displaced = self.headers_tip.stage_if_heavier(&mut batch, &block);
        let full_displaced = self.full_tip.stage_if_heavier(&mut batch, &block);
        self.storage.write_batch(batch)?;
        if let Some(prev) = headers_displaced {
            self.headers_tip.finalize(&block, prev);
        }
        if let Some(prev) = full_displaced {
            self.full_tip.finalize(&block, prev);
        }
        Ok(block)
    }

    // ==================== Verification ====================

    /// Header consensus checks. Stages the new epoch row when `raw`
    /// opens one; returns the enriched block with `size_bytes = 0`.
    fn verify_header(&self, raw: &RawBlock, batch: &mut WriteBatch) -> ChainResult<Block> {
        let hash = raw.hash();
        if self.has_block(&hash)? {
            return Err(ChainError::DuplicateBlock(hash));
        }
        let parent = self
            .block_by_hash(&raw.parent_hash)?
            .ok_or(ChainError::UnknownParent(raw.parent_hash))?;
        let height = parent.height + 1;

        let epoch = self.resolve_epoch(raw, &parent, height, batch)?;

        if !verify_pow(&hash, &epoch.difficulty) {
            return Err(ConsensusError::InvalidPow { hash }.into());
        }

        let claimed = work_from_bytes32(&raw.parent_total_work);
        if parent.accumulated_work != claimed {
            return Err(ConsensusError::InvalidParentTotalWork {
                expected: parent.accumulated_work,
                actual: claimed,
            }
            .into());
        }

        // Checked narrowing keeps the sum representable on disk.
        let accumulated_work: BigUint = &parent.accumulated_work + calculate_work(&hash);
        work_to_bytes32(&accumulated_work)?;

        debug!(
            height,
            epoch = %epoch.id(),
            acc_work = %accumulated_work,
            "header verified"
        );
        Ok(Block::from_raw(raw, height, epoch.id(), 0, accumulated_work))
    }

    /// Resolve the epoch governing a block at `height`. On an epoch
    /// boundary the difficulty is retargeted and the new epoch row is
    /// staged into the same batch as the block.
    fn resolve_epoch(
        &self,
        raw: &RawBlock,
        parent: &Block,
        height: u64,
        batch: &mut WriteBatch,
    ) -> ChainResult<Epoch> {
        let parent_epoch = self
            .epoch_by_id(&parent.epoch_id)?
            .ok_or_else(|| ChainError::EpochNotFound(parent.epoch_id.clone()))?;

        if height % self.config.epoch_length_blocks != 0 {
            return Ok(parent_epoch);
        }

        let epoch = next_epoch(&parent_epoch, raw.hash(), raw.timestamp, height, &self.config);
        info!(
            number = epoch.number,
            start_height = height,
            difficulty = %epoch.difficulty,
            "opening difficulty epoch"
        );
        batch.put(
            ColumnFamily::Epochs,
            epoch.id().into_bytes(),
            epoch.encode_row()?,
        );
        Ok(epoch)
    }

    /// Body checks: per-transaction version, signature, and state
    /// precheck, then the merkle commitment.
    fn verify_body(&self, expected_root: &Hash, body: &[RawTransaction]) -> ChainResult<()> {
        let mut envelopes = Vec::with_capacity(body.len());
        for (index, tx) in body.iter().enumerate() {
            if tx.version != TX_VERSION {
                return Err(ConsensusError::UnsupportedTxVersion(tx.version).into());
            }
            let envelope = tx.envelope();
            if !verify_signature(&hex::encode(tx.from_pubkey), &tx.sig, &envelope) {
                return Err(ChainError::InvalidSignature { index });
            }
            self.verifier
                .verify_tx(tx)
                .map_err(|source| ChainError::TxVerifyFailed { index, source })?;
            envelopes.push(envelope);
        }

        let actual = merkle_root(&envelopes);
        if actual != *expected_root {
            return Err(ConsensusError::InvalidMerkleRoot {
                expected: *expected_root,
                actual,
            }
            .into());
        }
        Ok(())
    }

    // ==================== Staging ====================

    fn stage_block(&self, batch: &mut WriteBatch, block: &Block) -> ChainResult<()> {
        batch.put(
            ColumnFamily::Blocks,
            block.hash.as_bytes().to_vec(),
            block.encode_row()?,
        );
        batch.put(
            ColumnFamily::Children,
            child_key(&block.parent_hash, &block.hash),
            Vec::new(),
        );
        Ok(())
    }

    /// Stage transaction and join rows. Already-stored transactions are
    /// skipped; the join rows carry the multiplicity.
    fn stage_body(
        &self,
        batch: &mut WriteBatch,
        block_hash: &Hash,
        body: &[RawTransaction],
    ) -> ChainResult<()> {
        for (index, tx) in body.iter().enumerate() {
            let txid = tx.txid();
            batch.put(
                ColumnFamily::BlockTransactions,
                tx_block_key(block_hash, index as u64),
                txid.as_bytes().to_vec(),
            );
            if !self
                .storage
                .contains(ColumnFamily::Transactions, txid.as_bytes())?
            {
                batch.put(
                    ColumnFamily::Transactions,
                    txid.as_bytes().to_vec(),
                    tx.to_bytes().to_vec(),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateMachine;
    use pyrite_mining::mine_block;
    use pyrite_storage::MemoryStorage;

    fn open_dag() -> BlockDag {
        let config = ConsensusConfig::for_tests(4, 40_000);
        BlockDag::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(StateMachine::new()),
            config,
        )
        .unwrap()
    }

    fn mine_child(dag: &BlockDag, parent: &Block, timestamp: u64) -> RawBlock {
        let difficulty = dag.epoch_for_block(&parent.hash).unwrap().difficulty;
        mine_block(parent, Vec::new(), [0u8; 32], timestamp, &difficulty).unwrap()
    }

    #[test]
    fn test_open_inserts_genesis_once() {
        let config = ConsensusConfig::for_tests(4, 40_000);
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let genesis_hash = config.genesis_block.hash();

        let dag = BlockDag::open(
            Arc::clone(&storage),
            Arc::new(StateMachine::new()),
            config.clone(),
        )
        .unwrap();
        let genesis = dag.block_by_hash(&genesis_hash).unwrap().unwrap();
        assert_eq!(genesis.height, 0);
        assert_eq!(genesis.accumulated_work, calculate_work(&genesis_hash));
        assert_eq!(dag.headers_tip().hash, genesis_hash);
        assert_eq!(dag.full_tip().hash, genesis_hash);
        drop(dag);

        // Reopening finds the same rows instead of reinitializing.
        let dag = BlockDag::open(storage, Arc::new(StateMachine::new()), config).unwrap();
        assert_eq!(dag.headers_tip().hash, genesis_hash);
    }

    #[test]
    fn test_ingest_block_advances_tips() {
        let dag = open_dag();
        let genesis = dag.full_tip();
        let raw = mine_child(&dag, &genesis, 10_000);

        let block = dag.ingest_block(&raw).unwrap();
        assert_eq!(block.height, 1);
        assert_eq!(
            block.accumulated_work,
            &genesis.accumulated_work + calculate_work(&raw.hash())
        );
        assert_eq!(dag.headers_tip().hash, block.hash);
        assert_eq!(dag.full_tip().hash, block.hash);
    }

    #[test]
    fn test_duplicate_block_rejected() {
        let dag = open_dag();
        let raw = mine_child(&dag, &dag.full_tip(), 10_000);
        dag.ingest_block(&raw).unwrap();
        assert!(matches!(
            dag.ingest_block(&raw),
            Err(ChainError::DuplicateBlock(h)) if h == raw.hash()
        ));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let dag = open_dag();
        let genesis = dag.full_tip();
        let mut raw = mine_child(&dag, &genesis, 10_000);
        raw.parent_hash = pyrite_consensus::sha256(b"nowhere");
        assert!(matches!(
            dag.ingest_block(&raw),
            Err(ChainError::UnknownParent(_))
        ));
        // Nothing was persisted for the rejected block.
        assert!(!dag.has_block(&raw.hash()).unwrap());
    }

    #[test]
    fn test_wrong_parent_total_work_rejected() {
        let dag = open_dag();
        let genesis = dag.full_tip();
        let difficulty = dag.epoch_for_block(&genesis.hash).unwrap().difficulty;
        let mut parent = genesis.clone();
        parent.accumulated_work += 1u32;
        // Mined against a falsified parent work commitment.
        let raw = mine_block(&parent, Vec::new(), [0u8; 32], 10_000, &difficulty).unwrap();

        match dag.ingest_block(&raw) {
            Err(ChainError::Consensus(ConsensusError::InvalidParentTotalWork {
                expected,
                actual,
            })) => {
                assert_eq!(expected, genesis.accumulated_work);
                assert_eq!(actual, parent.accumulated_work);
            }
            other => panic!("expected InvalidParentTotalWork, got {other:?}"),
        }
    }

    #[test]
    fn test_header_then_body_ingestion() {
        let dag = open_dag();
        let genesis = dag.full_tip();
        let raw = mine_child(&dag, &genesis, 10_000);

        let header = dag.ingest_header(&raw).unwrap();
        assert_eq!(header.size_bytes, 0);
        assert_eq!(dag.headers_tip().hash, header.hash);
        // The full tip waits for the body.
        assert_eq!(dag.full_tip().hash, genesis.hash);

        let full = dag.ingest_block_body(&raw.hash(), &raw.transactions).unwrap();
        assert_eq!(full.size_bytes, raw.size_bytes());
        assert_eq!(dag.full_tip().hash, full.hash);
    }

    #[test]
    fn test_body_for_unknown_header_rejected() {
        let dag = open_dag();
        let missing = pyrite_consensus::sha256(b"no-such-header");
        assert!(matches!(
            dag.ingest_block_body(&missing, &[]),
            Err(ChainError::BlockNotFound(_))
        ));
    }

    #[test]
    fn test_chain_hash_list_oldest_first() {
        let dag = open_dag();
        let genesis = dag.full_tip();
        let b1 = dag.ingest_block(&mine_child(&dag, &genesis, 10_000)).unwrap();
        let b2 = dag.ingest_block(&mine_child(&dag, &b1, 20_000)).unwrap();

        let list = dag.chain_hash_list(&b2.hash, 10).unwrap();
        assert_eq!(list, vec![genesis.hash, b1.hash, b2.hash]);

        // Depth bounds the walk from the tip backwards.
        let list = dag.chain_hash_list(&b2.hash, 2).unwrap();
        assert_eq!(list, vec![b1.hash, b2.hash]);
    }

    #[test]
    fn test_children_index() {
        let dag = open_dag();
        let genesis = dag.full_tip();
        let a = dag.ingest_block(&mine_child(&dag, &genesis, 10_000)).unwrap();
        let b = dag.ingest_block(&mine_child(&dag, &genesis, 11_000)).unwrap();

        let mut children = dag.children(&genesis.hash).unwrap();
        children.sort();
        let mut expected = vec![a.hash, b.hash];
        expected.sort();
        assert_eq!(children, expected);
    }

    #[test]
    fn test_headers_tip_hook_fires_after_commit() {
        let dag = open_dag();
        let genesis = dag.full_tip();
        let seen: Arc<parking_lot::Mutex<Vec<(Hash, Hash)>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        dag.set_on_new_headers_tip(move |new, prev| {
            seen_clone.lock().push((new.hash, prev.hash));
        });

        let raw = mine_child(&dag, &genesis, 10_000);
        dag.ingest_header(&raw).unwrap();

        let events = seen.lock();
        assert_eq!(events.as_slice(), &[(raw.hash(), genesis.hash)]);
    }
}
