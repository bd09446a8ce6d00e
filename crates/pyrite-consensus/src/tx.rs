//! Transaction wire format.
//!
//! Two canonical encodings exist for every transaction:
//! - the *envelope*, the signing and identity preimage, which excludes
//!   the signature;
//! - the *wire form*, the envelope with the signature inserted after the
//!   version byte, used wherever whole transactions are moved or stored.
//!
//! Both are fixed-width with big-endian integers and must stay bit-exact
//! across peers.

use crate::{sha256d, CodecError, Hash};

/// The only transaction version this node recognizes.
pub const TX_VERSION: u8 = 1;

/// Envelope size: version, from, to, amount, fee, nonce.
pub const TX_ENVELOPE_BYTES: usize = 1 + 65 + 65 + 8 + 8 + 8;

/// Wire size: the envelope plus the 64-byte signature.
pub const TX_WIRE_BYTES: usize = TX_ENVELOPE_BYTES + 64;

/// A transaction as it travels between peers.
///
/// `from_pubkey` and `to_pubkey` are uncompressed P-256 points; `sig` is
/// a raw `(r ∥ s)` ECDSA signature over the envelope.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawTransaction {
    pub version: u8,
    pub sig: [u8; 64],
    pub from_pubkey: [u8; 65],
    pub to_pubkey: [u8; 65],
    pub amount: u64,
    pub fee: u64,
    pub nonce: u64,
}

impl RawTransaction {
    /// The 155-byte signing and identity preimage.
    pub fn envelope(&self) -> [u8; TX_ENVELOPE_BYTES] {
        let mut buf = [0u8; TX_ENVELOPE_BYTES];
        buf[0] = self.version;
        buf[1..66].copy_from_slice(&self.from_pubkey);
        buf[66..131].copy_from_slice(&self.to_pubkey);
        buf[131..139].copy_from_slice(&self.amount.to_be_bytes());
        buf[139..147].copy_from_slice(&self.fee.to_be_bytes());
        buf[147..155].copy_from_slice(&self.nonce.to_be_bytes());
        buf
    }

    /// The 219-byte wire encoding.
    pub fn to_bytes(&self) -> [u8; TX_WIRE_BYTES] {
        let mut buf = [0u8; TX_WIRE_BYTES];
        buf[0] = self.version;
        buf[1..65].copy_from_slice(&self.sig);
        buf[65..130].copy_from_slice(&self.from_pubkey);
        buf[130..195].copy_from_slice(&self.to_pubkey);
        buf[195..203].copy_from_slice(&self.amount.to_be_bytes());
        buf[203..211].copy_from_slice(&self.fee.to_be_bytes());
        buf[211..219].copy_from_slice(&self.nonce.to_be_bytes());
        buf
    }

    /// Parse the 219-byte wire encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != TX_WIRE_BYTES {
            return Err(CodecError::UnexpectedLength {
                expected: TX_WIRE_BYTES,
                actual: bytes.len(),
            });
        }
        let mut sig = [0u8; 64];
        sig.copy_from_slice(&bytes[1..65]);
        let mut from_pubkey = [0u8; 65];
        from_pubkey.copy_from_slice(&bytes[65..130]);
        let mut to_pubkey = [0u8; 65];
        to_pubkey.copy_from_slice(&bytes[130..195]);
        Ok(Self {
            version: bytes[0],
            sig,
            from_pubkey,
            to_pubkey,
            amount: u64::from_be_bytes(bytes[195..203].try_into().expect("8-byte slice")),
            fee: u64::from_be_bytes(bytes[203..211].try_into().expect("8-byte slice")),
            nonce: u64::from_be_bytes(bytes[211..219].try_into().expect("8-byte slice")),
        })
    }

    /// Transaction identity: double SHA-256 of the envelope.
    ///
    /// The signature is not part of the identity, so re-signing the same
    /// payload cannot change the txid.
    pub fn txid(&self) -> Hash {
        sha256d(&self.envelope())
    }

    /// Wire size in bytes.
    pub fn size_bytes(&self) -> u64 {
        TX_WIRE_BYTES as u64
    }
}

impl std::fmt::Debug for RawTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawTransaction")
            .field("version", &self.version)
            .field("txid", &self.txid())
            .field("from", &hex::encode(&self.from_pubkey[..4]))
            .field("to", &hex::encode(&self.to_pubkey[..4]))
            .field("amount", &self.amount)
            .field("fee", &self.fee)
            .field("nonce", &self.nonce)
            .finish()
    }
}
