//! Error types for the CLI wallet.

use std::error::Error as StdError;
use std::fmt;

/// Errors that can occur in the CLI wallet.
#[derive(Debug)]
pub enum WalletError {
    /// Error when a file operation fails.
    FileError(std::io::Error),

    /// Error when JSON serialization or deserialization fails.
    JsonError(serde_json::Error),

    /// Error when a BIP32 operation fails.
    Bip32Error(bip32::Error),

    /// Error when signing or recovering a signature fails.
    SignatureError(custody_core::SignatureError),

    /// Error when a network operation fails.
    NetworkError(String),

    /// Error when a wallet operation fails.
    WalletError(String),

    /// Error when a transaction is rejected by the node.
    TransactionError(String),

    /// Error when an address is invalid.
    InvalidAddress(String),

    /// Error when an amount is invalid.
    InvalidAmount(String),

    /// Error when a request to the node fails.
    NodeRequestFailed(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::FileError(e) => write!(f, "File error: {}", e),
            WalletError::JsonError(e) => write!(f, "JSON error: {}", e),
            WalletError::Bip32Error(e) => write!(f, "BIP32 error: {}", e),
            WalletError::SignatureError(e) => write!(f, "Signature error: {}", e),
            WalletError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            WalletError::WalletError(msg) => write!(f, "Wallet error: {}", msg),
            WalletError::TransactionError(msg) => write!(f, "Transaction reverted: {}", msg),
            WalletError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            WalletError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            WalletError::NodeRequestFailed(msg) => write!(f, "Node request failed: {}", msg),
        }
    }
}

impl StdError for WalletError {}

impl From<std::io::Error> for WalletError {
    fn from(error: std::io::Error) -> Self {
        WalletError::FileError(error)
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(error: serde_json::Error) -> Self {
        WalletError::JsonError(error)
    }
}

impl From<bip32::Error> for WalletError {
    fn from(error: bip32::Error) -> Self {
        WalletError::Bip32Error(error)
    }
}

impl From<custody_core::SignatureError> for WalletError {
    fn from(error: custody_core::SignatureError) -> Self {
        WalletError::SignatureError(error)
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(error: reqwest::Error) -> Self {
        WalletError::NetworkError(error.to_string())
    }
}
