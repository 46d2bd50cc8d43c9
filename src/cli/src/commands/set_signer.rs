//! Set signer command for the CLI.

use super::{load_wallet, parse_account};
use crate::client::NodeClient;
use crate::config::WalletConfig;
use crate::errors::WalletError;
use custody_core::{Call, Receipt};
use std::path::Path;
use tracing::info;

/// Replaces the ledger's authorized signer. Only the owner's wallet succeeds.
pub async fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    signer: &str,
) -> Result<Receipt, WalletError> {
    let signer = parse_account(signer)?;
    let sender = load_wallet(wallet_path)?.authorizer()?;
    let client = NodeClient::new(&config.node);

    let receipt = client
        .send(&sender, Call::SetSignerAddress { signer })
        .await?;
    info!("Signer set to {:?}", signer);

    Ok(receipt)
}
