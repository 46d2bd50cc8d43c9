//! Initialize seed command for the CLI.

use crate::errors::WalletError;
use crate::wallet::Wallet;
use custody_core::Address;
use std::path::Path;
use tracing::{debug, info};

/// Runs the init-seed command, restoring from `phrase` when given and
/// starting at `account_index` when one is chosen.
pub async fn run<P: AsRef<Path>>(
    wallet_path: P,
    phrase: Option<&str>,
    account_index: Option<u32>,
) -> Result<Address, WalletError> {
    if wallet_path.as_ref().exists() {
        return Err(WalletError::WalletError(
            "Wallet file already exists. Use export-seed to view the seed.".to_string(),
        ));
    }

    let mut wallet = match phrase {
        Some(phrase) => {
            debug!("Restoring wallet from mnemonic");
            Wallet::from_phrase(phrase)?
        }
        None => Wallet::new()?,
    };
    if let Some(index) = account_index {
        wallet.set_account_index(index);
    }

    wallet.save(&wallet_path)?;
    info!("Wallet saved to {}", wallet_path.as_ref().display());

    let address = wallet.address()?;
    info!("Wallet address: {:?}", address);

    Ok(address)
}
