//! Signer and operator CLI for the custody ledger.

pub mod client;
pub mod commands;
pub mod config;
pub mod errors;
pub mod wallet;

pub use client::NodeClient;
pub use commands::{approve, authorize, balance, deposit, export_seed, init_seed, set_signer, withdraw};
pub use config::WalletConfig;
pub use errors::WalletError;
pub use wallet::Wallet;
