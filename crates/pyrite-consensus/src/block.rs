//! Block wire format, stored block rows, and difficulty epochs.

use crate::pow::{work_from_bytes32, work_to_bytes32};
use crate::{sha256, CodecError, ConsensusError, Hash, RawTransaction, TX_WIRE_BYTES};
use num_bigint::BigUint;

/// Serialized header size: parent hash, parent work commitment,
/// timestamp, transaction count, merkle root, nonce, graffiti.
pub const BLOCK_HEADER_BYTES: usize = 32 + 32 + 8 + 8 + 32 + 32 + 32;

/// Fixed prefix of an encoded block row, before the epoch id.
const BLOCK_ROW_FIXED_BYTES: usize = 32 + BLOCK_HEADER_BYTES + 8 + 8 + 32 + 2;

/// Longest epoch id a row may carry: a decimal height, an underscore,
/// and a 64-character hash.
const MAX_EPOCH_ID_BYTES: usize = 20 + 1 + 64;

/// Encoded epoch row size.
const EPOCH_ROW_BYTES: usize = 8 + 32 + 8 + 8 + 32;

/// A block as it travels between peers: header fields plus the
/// transaction body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawBlock {
    pub parent_hash: Hash,
    /// Commitment to the parent's accumulated work, 32-byte big-endian.
    pub parent_total_work: [u8; 32],
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub num_transactions: u64,
    pub transactions_merkle_root: Hash,
    pub nonce: [u8; 32],
    /// Free-form miner field; not interpreted by consensus.
    pub graffiti: [u8; 32],
    pub transactions: Vec<RawTransaction>,
}

impl RawBlock {
    /// The canonical header serialization, fields in declaration order.
    pub fn header_bytes(&self) -> [u8; BLOCK_HEADER_BYTES] {
        let mut buf = [0u8; BLOCK_HEADER_BYTES];
        buf[0..32].copy_from_slice(self.parent_hash.as_bytes());
        buf[32..64].copy_from_slice(&self.parent_total_work);
        buf[64..72].copy_from_slice(&self.timestamp.to_be_bytes());
        buf[72..80].copy_from_slice(&self.num_transactions.to_be_bytes());
        buf[80..112].copy_from_slice(self.transactions_merkle_root.as_bytes());
        buf[112..144].copy_from_slice(&self.nonce);
        buf[144..176].copy_from_slice(&self.graffiti);
        buf
    }

    /// Block identity: SHA-256 of the header. The body is committed
    /// through the merkle root, not hashed directly.
    pub fn hash(&self) -> Hash {
        sha256(&self.header_bytes())
    }

    /// Serialized size of header plus body.
    pub fn size_bytes(&self) -> u64 {
        BLOCK_HEADER_BYTES as u64 + TX_WIRE_BYTES as u64 * self.transactions.len() as u64
    }

    /// Full wire encoding: header followed by each transaction.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size_bytes() as usize);
        buf.extend_from_slice(&self.header_bytes());
        for tx in &self.transactions {
            buf.extend_from_slice(&tx.to_bytes());
        }
        buf
    }

    /// Parse the full wire encoding. The body length must match the
    /// header's transaction count exactly.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < BLOCK_HEADER_BYTES {
            return Err(CodecError::Truncated {
                needed: BLOCK_HEADER_BYTES - bytes.len(),
                remaining: bytes.len(),
            });
        }
        let (header, body) = bytes.split_at(BLOCK_HEADER_BYTES);

        let num_transactions =
            u64::from_be_bytes(header[72..80].try_into().expect("8-byte slice"));
        let expected_body = (num_transactions as usize)
            .checked_mul(TX_WIRE_BYTES)
            .ok_or(CodecError::InconsistentCount {
                declared: num_transactions,
                actual: (body.len() / TX_WIRE_BYTES) as u64,
            })?;
        if body.len() != expected_body {
            return Err(CodecError::InconsistentCount {
                declared: num_transactions,
                actual: (body.len() / TX_WIRE_BYTES) as u64,
            });
        }

        let transactions = body
            .chunks_exact(TX_WIRE_BYTES)
            .map(RawTransaction::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;

        let mut parent_hash = [0u8; 32];
        parent_hash.copy_from_slice(&header[0..32]);
        let mut parent_total_work = [0u8; 32];
        parent_total_work.copy_from_slice(&header[32..64]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&header[80..112]);
        let mut nonce = [0u8; 32];
        nonce.copy_from_slice(&header[112..144]);
        let mut graffiti = [0u8; 32];
        graffiti.copy_from_slice(&header[144..176]);

        Ok(Self {
            parent_hash: Hash::from_bytes(parent_hash),
            parent_total_work,
            timestamp: u64::from_be_bytes(header[64..72].try_into().expect("8-byte slice")),
            num_transactions,
            transactions_merkle_root: Hash::from_bytes(merkle_root),
            nonce,
            graffiti,
            transactions,
        })
    }
}

/// A block as stored in the DAG: the raw header enriched with its
/// position and weight in the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub hash: Hash,
    pub parent_hash: Hash,
    pub parent_total_work: BigUint,
    pub timestamp: u64,
    pub num_transactions: u64,
    pub transactions_merkle_root: Hash,
    pub nonce: [u8; 32],
    pub graffiti: [u8; 32],
    pub height: u64,
    pub epoch_id: String,
    /// Header-plus-body size; zero while only the header is known.
    pub size_bytes: u64,
    /// Work of this block plus everything behind it; the tip metric.
    pub accumulated_work: BigUint,
}

impl Block {
    /// Enrich a raw block with its chain position.
    pub fn from_raw(
        raw: &RawBlock,
        height: u64,
        epoch_id: String,
        size_bytes: u64,
        accumulated_work: BigUint,
    ) -> Self {
        Self {
            hash: raw.hash(),
            parent_hash: raw.parent_hash,
            parent_total_work: work_from_bytes32(&raw.parent_total_work),
            timestamp: raw.timestamp,
            num_transactions: raw.num_transactions,
            transactions_merkle_root: raw.transactions_merkle_root,
            nonce: raw.nonce,
            graffiti: raw.graffiti,
            height,
            epoch_id,
            size_bytes,
            accumulated_work,
        }
    }

    /// Encode as a storage row.
    pub fn encode_row(&self) -> Result<Vec<u8>, ConsensusError> {
        let epoch_id = self.epoch_id.as_bytes();
        if epoch_id.len() > MAX_EPOCH_ID_BYTES {
            return Err(CodecError::FieldTooLong {
                length: epoch_id.len(),
                max: MAX_EPOCH_ID_BYTES,
            }
            .into());
        }
        let mut buf = Vec::with_capacity(BLOCK_ROW_FIXED_BYTES + epoch_id.len());
        buf.extend_from_slice(self.hash.as_bytes());
        buf.extend_from_slice(self.parent_hash.as_bytes());
        buf.extend_from_slice(&work_to_bytes32(&self.parent_total_work)?);
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&self.num_transactions.to_be_bytes());
        buf.extend_from_slice(self.transactions_merkle_root.as_bytes());
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.graffiti);
        buf.extend_from_slice(&self.height.to_be_bytes());
        buf.extend_from_slice(&self.size_bytes.to_be_bytes());
        buf.extend_from_slice(&work_to_bytes32(&self.accumulated_work)?);
        buf.extend_from_slice(&(epoch_id.len() as u16).to_be_bytes());
        buf.extend_from_slice(epoch_id);
        Ok(buf)
    }

    /// Decode a storage row.
    pub fn decode_row(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < BLOCK_ROW_FIXED_BYTES {
            return Err(CodecError::Truncated {
                needed: BLOCK_ROW_FIXED_BYTES - bytes.len(),
                remaining: bytes.len(),
            });
        }

        let take32 = |offset: usize| -> [u8; 32] {
            bytes[offset..offset + 32].try_into().expect("32-byte slice")
        };
        let take_u64 = |offset: usize| -> u64 {
            u64::from_be_bytes(bytes[offset..offset + 8].try_into().expect("8-byte slice"))
        };

        let epoch_len =
            u16::from_be_bytes(bytes[256..258].try_into().expect("2-byte slice")) as usize;
        if epoch_len > MAX_EPOCH_ID_BYTES {
            return Err(CodecError::FieldTooLong {
                length: epoch_len,
                max: MAX_EPOCH_ID_BYTES,
            });
        }
        if bytes.len() != BLOCK_ROW_FIXED_BYTES + epoch_len {
            return Err(CodecError::UnexpectedLength {
                expected: BLOCK_ROW_FIXED_BYTES + epoch_len,
                actual: bytes.len(),
            });
        }
        let epoch_id = std::str::from_utf8(&bytes[258..258 + epoch_len])
            .map_err(|_| CodecError::InvalidUtf8 { field: "epoch_id" })?
            .to_string();

        Ok(Self {
            hash: Hash::from_bytes(take32(0)),
            parent_hash: Hash::from_bytes(take32(32)),
            parent_total_work: work_from_bytes32(&take32(64)),
            timestamp: take_u64(96),
            num_transactions: take_u64(104),
            transactions_merkle_root: Hash::from_bytes(take32(112)),
            nonce: take32(144),
            graffiti: take32(176),
            height: take_u64(208),
            size_bytes: take_u64(216),
            accumulated_work: work_from_bytes32(&take32(224)),
            epoch_id,
        })
    }
}

/// A difficulty epoch: a run of blocks sharing one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Epoch {
    pub number: u64,
    pub start_block_hash: Hash,
    /// Timestamp of the epoch's first block, milliseconds.
    pub start_time: u64,
    pub start_height: u64,
    /// Difficulty target: a hash `h` satisfies POW iff `u256(h) < difficulty`.
    pub difficulty: BigUint,
}

impl Epoch {
    /// Epoch identity: decimal start height, underscore, hex start hash.
    pub fn id(&self) -> String {
        format!("{}_{}", self.start_height, self.start_block_hash.to_hex())
    }

    /// Encode as a storage row.
    pub fn encode_row(&self) -> Result<Vec<u8>, ConsensusError> {
        let mut buf = Vec::with_capacity(EPOCH_ROW_BYTES);
        buf.extend_from_slice(&self.number.to_be_bytes());
        buf.extend_from_slice(self.start_block_hash.as_bytes());
        buf.extend_from_slice(&self.start_time.to_be_bytes());
        buf.extend_from_slice(&self.start_height.to_be_bytes());
        buf.extend_from_slice(&work_to_bytes32(&self.difficulty)?);
        Ok(buf)
    }

    /// Decode a storage row.
    pub fn decode_row(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != EPOCH_ROW_BYTES {
            return Err(CodecError::UnexpectedLength {
                expected: EPOCH_ROW_BYTES,
                actual: bytes.len(),
            });
        }
        let mut start_block_hash = [0u8; 32];
        start_block_hash.copy_from_slice(&bytes[8..40]);
        let mut difficulty = [0u8; 32];
        difficulty.copy_from_slice(&bytes[56..88]);
        Ok(Self {
            number: u64::from_be_bytes(bytes[0..8].try_into().expect("8-byte slice")),
            start_block_hash: Hash::from_bytes(start_block_hash),
            start_time: u64::from_be_bytes(bytes[40..48].try_into().expect("8-byte slice")),
            start_height: u64::from_be_bytes(bytes[48..56].try_into().expect("8-byte slice")),
            difficulty: BigUint::from_bytes_be(&difficulty),
        })
    }
}
