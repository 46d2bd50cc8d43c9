//! Withdrawal authorization commands.
//!
//! `authorize` is run by whoever holds the signer key: it produces the
//! 65-byte signature a depositor passes to `withdraw`. `verify` checks such a
//! signature offline.

use super::{load_wallet, parse_account};
use crate::errors::WalletError;
use custody_core::signature::recover_authorizer;
use custody_core::{Address, Balance, Bytes};
use std::path::Path;
use tracing::info;

/// Signs a withdrawal of `amount` by `account` with the wallet's key.
pub async fn run<P: AsRef<Path>>(
    wallet_path: P,
    account: &str,
    amount: Balance,
) -> Result<Bytes, WalletError> {
    let account = parse_account(account)?;
    let signer = load_wallet(wallet_path)?.authorizer()?;

    let signature = signer.authorize(account, amount)?;
    info!("Authorized {:?} to withdraw {} as {:?}", account, amount, signer.address());

    Ok(signature)
}

/// Recovers the signer of an authorization.
pub fn verify(account: &str, amount: Balance, signature: &str) -> Result<Address, WalletError> {
    let account = parse_account(account)?;
    let signature = hex::decode(signature.trim_start_matches("0x"))
        .map_err(|e| WalletError::WalletError(format!("Invalid signature hex: {}", e)))?;

    Ok(recover_authorizer(account, amount, &signature)?)
}
