//! Export seed command for the CLI.

use super::load_wallet;
use crate::errors::WalletError;
use std::path::Path;
use tracing::debug;

/// Runs the export-seed command.
pub async fn run<P: AsRef<Path>>(wallet_path: P) -> Result<String, WalletError> {
    let wallet = load_wallet(&wallet_path)?;
    debug!("Loaded wallet from {}", wallet_path.as_ref().display());

    Ok(wallet.mnemonic().to_string())
}
