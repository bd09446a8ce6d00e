//! Error types for the wallet.

use thiserror::Error;

/// Wallet-specific errors.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Secret key material was not valid hex.
    #[error("invalid hex in secret key")]
    InvalidHex,

    /// Bytes did not form a valid P-256 scalar.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;
