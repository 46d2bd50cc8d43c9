//! Core of the custody ledger.
//!
//! This crate provides the custodial ledger, the signature scheme that gates
//! withdrawals, the token resource interface, and a host runtime that applies
//! calls to them atomically.

pub mod errors;
pub mod ledger;
pub mod runtime;
pub mod signature;
pub mod token;
pub mod types;

// Re-export commonly used types
pub use errors::{LedgerError, RuntimeError, SignatureError, TokenError};
pub use ledger::Ledger;
pub use runtime::Runtime;
pub use signature::Authorizer;
pub use token::{MemoryToken, TokenResource};
pub use types::{Address, Balance, Bytes, Call, LedgerEvent, Nonce, Receipt, SignedCall, U256};
