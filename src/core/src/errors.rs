//! Error types for the core crate.

use crate::types::{Address, Nonce};
use thiserror::Error;

/// Reasons a ledger operation reverts.
///
/// The `Display` strings are the revert reasons observed by callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The caller's allowance to the ledger is below the deposit amount.
    #[error("Token not approved for deposit")]
    NotApproved,

    /// The caller holds fewer tokens than the deposit amount.
    #[error("Insufficient token balance")]
    InsufficientTokenBalance,

    /// The caller's ledger balance is below the withdrawal amount.
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// The authorization was not produced by the current signer.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The authorization could not be parsed or recovered.
    #[error("ECDSA: {0}")]
    MalformedSignature(String),

    /// A restricted call was made by someone other than the owner.
    #[error("Ownable: caller is not the owner")]
    NotOwner,

    /// A bare native-currency payment was sent to the ledger.
    #[error("Invalid transaction")]
    InvalidTransaction,

    /// The token resource rejected a call made by the ledger.
    #[error("{0}")]
    Token(#[from] TokenError),

    /// The supplied token resource is not the one fixed at deployment.
    #[error("Token mismatch: expected {expected:?}, got {actual:?}")]
    TokenMismatch {
        /// The token address fixed at deployment
        expected: Address,
        /// The address of the resource that was supplied
        actual: Address,
    },

    /// A balance update would overflow 256 bits.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

/// Errors reported by a token resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The source account holds fewer tokens than requested.
    #[error("ERC20: transfer amount exceeds balance")]
    InsufficientBalance,

    /// The spender's allowance is below the requested amount.
    #[error("ERC20: insufficient allowance")]
    InsufficientAllowance,

    /// Tokens cannot be sent to the zero address.
    #[error("ERC20: transfer to the zero address")]
    TransferToZero,

    /// Allowances cannot be granted to the zero address.
    #[error("ERC20: approve to the zero address")]
    ApproveToZero,

    /// A balance update would overflow 256 bits.
    #[error("Arithmetic overflow")]
    Overflow,
}

/// Errors from parsing or recovering a secp256k1 signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature is not 65 bytes long.
    #[error("invalid signature length: {0} (expected 65)")]
    InvalidLength(usize),

    /// The recovery byte is not 27 or 28.
    #[error("invalid signature 'v' value: {0}")]
    InvalidRecoveryId(u8),

    /// The `s` component is in the upper half of the curve order.
    #[error("invalid signature 's' value")]
    HighS,

    /// No public key could be recovered from the signature.
    #[error("invalid signature: {0}")]
    Recovery(String),

    /// The signing key failed to produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Errors from applying a call through the runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The ledger or token reverted the call.
    #[error("{0}")]
    Reverted(#[from] LedgerError),

    /// The envelope signature could not be recovered.
    #[error("Invalid transaction signature: {0}")]
    InvalidEnvelope(#[from] SignatureError),

    /// The envelope nonce does not match the sender's next nonce.
    #[error("Invalid nonce: expected {expected}, got {actual}")]
    InvalidNonce {
        /// The sender's next nonce
        expected: Nonce,
        /// The nonce on the envelope
        actual: Nonce,
    },

    /// The envelope payload could not be encoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<SignatureError> for LedgerError {
    fn from(error: SignatureError) -> Self {
        match error {
            SignatureError::InvalidLength(_) => {
                LedgerError::MalformedSignature("invalid signature length".to_string())
            }
            SignatureError::HighS => {
                LedgerError::MalformedSignature("invalid signature 's' value".to_string())
            }
            other => LedgerError::MalformedSignature(format!("{}", other)),
        }
    }
}
