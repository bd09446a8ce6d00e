//! P-256 keypair wrapper.

use crate::{WalletError, WalletResult};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use pyrite_consensus::sha256d;
use rand::rngs::OsRng;

/// A P-256 ECDSA keypair.
pub struct Wallet {
    signing_key: SigningKey,
}

impl Wallet {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Restore a wallet from a hex-encoded 32-byte secret scalar.
    pub fn from_secret_hex(secret: &str) -> WalletResult<Self> {
        let bytes = hex::decode(secret).map_err(|_| WalletError::InvalidHex)?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| WalletError::InvalidSecretKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Hex-encoded secret scalar.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Uncompressed SEC1 public key: `0x04 ∥ X ∥ Y`, 65 bytes.
    pub fn pubkey_bytes(&self) -> [u8; 65] {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        point
            .as_bytes()
            .try_into()
            .expect("uncompressed P-256 point is 65 bytes")
    }

    /// Hex-encoded public key.
    pub fn pubkey_hex(&self) -> String {
        hex::encode(self.pubkey_bytes())
    }

    /// Wallet address: double SHA-256 of the hex public key string.
    pub fn address(&self) -> String {
        sha256d(self.pubkey_hex().as_bytes()).to_hex()
    }

    /// Sign a message: SHA-256 digest, then ECDSA, returned as the raw
    /// 64-byte `(r ∥ s)` pair. Signing is deterministic (RFC 6979).
    pub fn sign(&self, msg: &[u8]) -> [u8; 64] {
        let signature: Signature = self.signing_key.sign(msg);
        let bytes = signature.to_bytes();
        let mut out = [0u8; 64];
        out.copy_from_slice(&bytes);
        out
    }
}

/// Verify a raw `(r ∥ s)` signature over `msg` against a hex-encoded
/// uncompressed public key. Any malformed input verifies false.
pub fn verify_signature(pubkey_hex: &str, sig: &[u8], msg: &[u8]) -> bool {
    let Ok(pubkey_bytes) = hex::decode(pubkey_hex) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&pubkey_bytes) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(sig) else {
        return false;
    };
    verifying_key.verify(msg, &signature).is_ok()
}
