//! Commands for the CLI.

pub mod approve;
pub mod authorize;
pub mod balance;
pub mod deposit;
pub mod export_seed;
pub mod init_seed;
pub mod set_signer;
pub mod withdraw;

use crate::errors::WalletError;
use crate::wallet::Wallet;
use custody_core::types::parse_address;
use custody_core::{Address, Balance};
use std::path::Path;

/// Loads the wallet at `wallet_path`, failing with a hint when it is missing.
pub fn load_wallet<P: AsRef<Path>>(wallet_path: P) -> Result<Wallet, WalletError> {
    if !wallet_path.as_ref().exists() {
        return Err(WalletError::WalletError(
            "Wallet file does not exist. Use init-seed to create a new wallet.".to_string(),
        ));
    }

    Wallet::load(wallet_path)
        .map_err(|e| WalletError::WalletError(format!("Failed to load wallet: {}", e)))
}

/// Parses a `0x`-prefixed (or bare) 20-byte hex address.
pub fn parse_account(raw: &str) -> Result<Address, WalletError> {
    parse_address(raw).ok_or_else(|| WalletError::InvalidAddress(raw.to_string()))
}

/// Parses a decimal token amount in base units.
pub fn parse_amount(raw: &str) -> Result<Balance, WalletError> {
    Balance::from_dec_str(raw.trim()).map_err(|_| WalletError::InvalidAmount(raw.to_string()))
}
