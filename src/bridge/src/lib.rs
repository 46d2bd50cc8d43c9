//! EVM contract client for the custody ledger.
//!
//! This crate drives a deployed ledger contract and its token over JSON-RPC,
//! using the same withdrawal authorizations the in-process ledger accepts.

pub mod bindings;
pub mod bridge;
pub mod errors;

pub use bindings::{parse_ledger_log, LedgerContract, TokenContract};
pub use bridge::{connect_with_key, CustodyClient};
pub use errors::BridgeError;
