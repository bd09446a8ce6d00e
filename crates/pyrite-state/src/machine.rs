//! The account-balance state machine.
//!
//! A deterministic transition function over `pubkey -> balance`. It
//! encapsulates exactly two effects: minting through the coinbase
//! transaction and transferring between accounts. It knows nothing about
//! consensus, ordering, or signatures — the DAG sequences transactions
//! and verifies authorship before they reach this layer.

use crate::StateError;
use pyrite_consensus::{RawTransaction, TX_VERSION};
use std::collections::HashMap;

/// An updated `(pubkey, balance)` pair emitted by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateLeaf {
    pub pubkey: [u8; 65],
    pub balance: u64,
}

/// Input to the transition function.
#[derive(Clone, Debug)]
pub struct TransitionInput {
    /// The transaction to process.
    pub tx: RawTransaction,
    /// Whether this is the block's coinbase (always index 0).
    pub is_coinbase: bool,
    /// Recipient of the transaction fee.
    pub miner_pubkey: [u8; 65],
}

/// The capability the ingestion pipeline needs from a state machine:
/// a cheap admission precheck. The authoritative test of a transaction
/// is transition success during replay.
pub trait TxVerifier: Send + Sync {
    fn verify_tx(&self, tx: &RawTransaction) -> Result<(), StateError>;
}

/// Account balances, keyed by public key. Missing keys read as zero.
#[derive(Default, Debug)]
pub struct StateMachine {
    balances: HashMap<[u8; 65], u64>,
}

impl StateMachine {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of an account; zero if never seen.
    pub fn balance(&self, pubkey: &[u8; 65]) -> u64 {
        self.balances.get(pubkey).copied().unwrap_or(0)
    }

    /// Number of accounts with a recorded balance.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether no account has a recorded balance.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Snapshot of every recorded account, ordered by public key.
    pub fn leaves(&self) -> Vec<StateLeaf> {
        let mut leaves: Vec<StateLeaf> = self
            .balances
            .iter()
            .map(|(pubkey, balance)| StateLeaf {
                pubkey: *pubkey,
                balance: *balance,
            })
            .collect();
        leaves.sort_by(|a, b| a.pubkey.cmp(&b.pubkey));
        leaves
    }

    /// Run one transition. Reads the current state, never mutates it;
    /// the caller applies the emitted leaves.
    pub fn transition(&self, input: &TransitionInput) -> Result<Vec<StateLeaf>, StateError> {
        if input.tx.version != TX_VERSION {
            return Err(StateError::UnsupportedTxVersion(input.tx.version));
        }
        if input.is_coinbase {
            self.transition_coinbase(input)
        } else {
            self.transition_transfer(input)
        }
    }

    /// Coinbase: mint `amount` to the recipient. The `from` field names
    /// the miner but is never read as an account here.
    fn transition_coinbase(&self, input: &TransitionInput) -> Result<Vec<StateLeaf>, StateError> {
        let to_balance = self
            .balance(&input.tx.to_pubkey)
            .checked_add(input.tx.amount)
            .ok_or(StateError::ToBalanceOverflow)?;

        Ok(vec![StateLeaf {
            pubkey: input.tx.to_pubkey,
            balance: to_balance,
        }])
    }

    /// Transfer: debit the sender `amount + fee`, credit the recipient
    /// `amount`, credit the miner `fee`.
    fn transition_transfer(&self, input: &TransitionInput) -> Result<Vec<StateLeaf>, StateError> {
        let tx = &input.tx;
        let from_balance = self.balance(&tx.from_pubkey);

        let to_balance = self
            .balance(&tx.to_pubkey)
            .checked_add(tx.amount)
            .ok_or(StateError::ToBalanceOverflow)?;
        let miner_balance = self
            .balance(&input.miner_pubkey)
            .checked_add(tx.fee)
            .ok_or(StateError::MinerBalanceOverflow)?;
        let required = tx
            .amount
            .checked_add(tx.fee)
            .ok_or(StateError::AmountPlusFeeOverflow)?;

        if from_balance < required {
            return Err(StateError::InsufficientBalance {
                balance: from_balance,
                required,
            });
        }

        Ok(vec![
            StateLeaf {
                pubkey: tx.from_pubkey,
                balance: from_balance - required,
            },
            StateLeaf {
                pubkey: tx.to_pubkey,
                balance: to_balance,
            },
            StateLeaf {
                pubkey: input.miner_pubkey,
                balance: miner_balance,
            },
        ])
    }

    /// Overwrite balances with the emitted leaves, in leaf order.
    pub fn apply(&mut self, leaves: &[StateLeaf]) {
        for leaf in leaves {
            self.balances.insert(leaf.pubkey, leaf.balance);
        }
    }
}

impl TxVerifier for StateMachine {
    /// Admission precheck: version gate only. Balance sufficiency is
    /// deliberately left to replay, where ordering is authoritative.
    fn verify_tx(&self, tx: &RawTransaction) -> Result<(), StateError> {
        if tx.version != TX_VERSION {
            return Err(StateError::UnsupportedTxVersion(tx.version));
        }
        Ok(())
    }
}
