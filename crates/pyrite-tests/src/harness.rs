//! Test harness: a node core over a throwaway on-disk database.

use pyrite_consensus::ConsensusConfig;
use pyrite_state::{BlockDag, StateMachine, TxVerifier};
use pyrite_storage::{Database, Storage};
use std::sync::Arc;
use tempfile::TempDir;

/// A block DAG over a temp-dir RocksDB, plus a raw storage handle for
/// row-level assertions. The directory lives as long as the harness.
pub struct TestNode {
    pub dag: BlockDag,
    pub storage: Arc<Database>,
    tmp: TempDir,
}

impl TestNode {
    /// Open a fresh node with the given config.
    pub fn open(config: ConsensusConfig) -> Self {
        Self::open_with_verifier(config, Arc::new(StateMachine::new()))
    }

    /// Open a fresh node with a substitute transaction verifier.
    pub fn open_with_verifier(config: ConsensusConfig, verifier: Arc<dyn TxVerifier>) -> Self {
        init_tracing();
        let tmp = TempDir::new().expect("create temp dir");
        let storage = Arc::new(Database::open(tmp.path()).expect("open database"));
        let dag = BlockDag::open(Arc::clone(&storage) as Arc<dyn Storage>, verifier, config)
            .expect("open block DAG");
        Self { dag, storage, tmp }
    }

    /// Open a fresh node with the default test config: 4-block epochs,
    /// a 40-second epoch target, and an easy (2^240) genesis difficulty.
    pub fn open_default() -> Self {
        Self::open(ConsensusConfig::for_tests(4, 40_000))
    }

    /// Drop the DAG and reopen it over the same directory, as a node
    /// restart would.
    pub fn reopen(self) -> Self {
        let TestNode { dag, storage, tmp } = self;
        let config = dag.config().clone();
        drop(dag);
        drop(storage);
        let storage = Arc::new(Database::open(tmp.path()).expect("reopen database"));
        let dag = BlockDag::open(
            Arc::clone(&storage) as Arc<dyn Storage>,
            Arc::new(StateMachine::new()),
            config,
        )
        .expect("reopen block DAG");
        Self { dag, storage, tmp }
    }
}

/// Install a compact tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}
