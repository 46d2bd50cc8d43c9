/// Error types for the bridge crate.
use std::error::Error as StdError;
use std::fmt;

/// Errors that can occur in the bridge crate.
#[derive(Debug)]
pub enum BridgeError {
    /// Error when talking to the EVM node fails.
    EthereumError(String),

    /// Error when a contract call cannot be built or is rejected.
    ContractError(String),

    /// Error when a transaction fails or is dropped.
    TransactionError(String),

    /// Error when producing a withdrawal authorization fails.
    SignatureError(String),

    /// Error when an address is invalid.
    InvalidAddress(String),

    /// Error when an ABI cannot be parsed or a log cannot be decoded.
    AbiError(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::EthereumError(msg) => write!(f, "Ethereum error: {}", msg),
            BridgeError::ContractError(msg) => write!(f, "Contract error: {}", msg),
            BridgeError::TransactionError(msg) => write!(f, "Transaction error: {}", msg),
            BridgeError::SignatureError(msg) => write!(f, "Signature error: {}", msg),
            BridgeError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            BridgeError::AbiError(msg) => write!(f, "ABI error: {}", msg),
        }
    }
}

impl StdError for BridgeError {}

impl From<custody_core::SignatureError> for BridgeError {
    fn from(error: custody_core::SignatureError) -> Self {
        BridgeError::SignatureError(error.to_string())
    }
}
