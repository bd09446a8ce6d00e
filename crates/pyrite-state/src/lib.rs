//! # pyrite-state
//!
//! The pyrite node's chain state: the persistent block DAG and the
//! account-balance state machine.
//!
//! The [`BlockDag`] ingests raw blocks — structurally, cryptographically,
//! and economically verifying each against its parent and epoch — and
//! persists every accepted block atomically, tracking the heaviest
//! header and full-block tips. The [`StateMachine`] is a deterministic
//! transition function over account balances; [`rebuild_state`] replays
//! the canonical chain through it from scratch.
//!
//! Reorg handling is deliberately replay-based: the state machine is
//! never mutated incrementally across a tip switch, it is rebuilt from
//! the new canonical hash list.

mod dag;
mod error;
mod machine;
mod replay;

pub use dag::{BlockDag, TipHook};
pub use error::{ChainError, ChainResult, StateError};
pub use machine::{StateLeaf, StateMachine, TransitionInput, TxVerifier};
pub use replay::rebuild_state;
