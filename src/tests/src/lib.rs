//! Integration tests for the custody ledger.

pub mod ledger_tests;
pub mod node_tests;
pub mod signature_tests;
pub mod wallet_tests;
