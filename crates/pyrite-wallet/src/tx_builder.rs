//! Signed transaction construction.

use crate::Wallet;
use pyrite_consensus::{RawTransaction, TX_VERSION};

/// Build and sign a transfer from `wallet` to `to`.
pub fn build_transfer(
    wallet: &Wallet,
    to: [u8; 65],
    amount: u64,
    fee: u64,
    nonce: u64,
) -> RawTransaction {
    let mut tx = RawTransaction {
        version: TX_VERSION,
        sig: [0u8; 64],
        from_pubkey: wallet.pubkey_bytes(),
        to_pubkey: to,
        amount,
        fee,
        nonce,
    };
    tx.sig = wallet.sign(&tx.envelope());
    tx
}

/// Build and sign a coinbase minting `reward` to `to`.
///
/// The coinbase is identified positionally (first in a block); its
/// `from` field names the miner collecting the block's fees.
pub fn build_coinbase(miner: &Wallet, to: [u8; 65], reward: u64) -> RawTransaction {
    let mut tx = RawTransaction {
        version: TX_VERSION,
        sig: [0u8; 64],
        from_pubkey: miner.pubkey_bytes(),
        to_pubkey: to,
        amount: reward,
        fee: 0,
        nonce: 0,
    };
    tx.sig = miner.sign(&tx.envelope());
    tx
}
