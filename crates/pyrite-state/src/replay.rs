//! Canonical chain replay.
//!
//! Account state is never mutated incrementally across a reorg; it is
//! rebuilt from scratch by running every transaction of the canonical
//! chain through the state machine in order.

use crate::{BlockDag, ChainError, ChainResult, StateMachine, TransitionInput};
use pyrite_consensus::Hash;
use tracing::debug;

/// Replay `chain` (oldest block first) through `machine` and return the
/// resulting state.
///
/// Within each block, transactions are applied in txindex order. Index 0
/// is the coinbase; its `from` field fixes the fee recipient for the
/// rest of the block. Each transition's leaves are applied before the
/// next transaction runs. Any failed transition aborts the rebuild,
/// identifying the offending `(block, tx_index)`.
pub fn rebuild_state(
    dag: &BlockDag,
    mut machine: StateMachine,
    chain: &[Hash],
) -> ChainResult<StateMachine> {
    for block_hash in chain {
        let txs = dag.block_transactions(block_hash)?;
        debug!(block = %block_hash, transactions = txs.len(), "replaying block");

        let mut miner_pubkey = [0u8; 65];
        for (index, tx) in txs.iter().enumerate() {
            let is_coinbase = index == 0;
            if is_coinbase {
                miner_pubkey = tx.from_pubkey;
            }

            let leaves = machine
                .transition(&TransitionInput {
                    tx: *tx,
                    is_coinbase,
                    miner_pubkey,
                })
                .map_err(|source| ChainError::Replay {
                    block: *block_hash,
                    tx_index: index,
                    source,
                })?;
            machine.apply(&leaves);
        }
    }
    Ok(machine)
}
