//! Approve command for the CLI.

use super::load_wallet;
use crate::client::NodeClient;
use crate::config::WalletConfig;
use crate::errors::WalletError;
use custody_core::{Balance, Call, Receipt};
use std::path::Path;
use tracing::info;

/// Approves the ledger to pull `amount` tokens from the wallet's account.
pub async fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    amount: Balance,
) -> Result<Receipt, WalletError> {
    let sender = load_wallet(wallet_path)?.authorizer()?;
    let client = NodeClient::new(&config.node);

    let ledger = client.ledger_address().await?;
    info!("Approving ledger {:?} for {}", ledger, amount);

    client
        .send(&sender, Call::Approve { spender: ledger, amount })
        .await
}
