//! # pyrite-wallet
//!
//! Keys and signing for the pyrite blockchain.
//!
//! Wallets hold a NIST P-256 ECDSA keypair. Public keys travel as
//! 65-byte uncompressed SEC1 points; signatures are 64-byte raw
//! `(r ∥ s)` pairs over the SHA-256 of the transaction envelope. These
//! formats are fixed by the wire protocol and must not change.

mod error;
mod tx_builder;
mod wallet;

pub use error::{WalletError, WalletResult};
pub use tx_builder::{build_coinbase, build_transfer};
pub use wallet::{verify_signature, Wallet};
