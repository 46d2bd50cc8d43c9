//! Withdraw command for the CLI.

use super::load_wallet;
use crate::client::NodeClient;
use crate::config::WalletConfig;
use crate::errors::WalletError;
use custody_core::{Balance, Bytes, Call, Receipt};
use std::path::Path;
use tracing::info;

/// Withdraws `amount` tokens using a signer's authorization.
///
/// `signature` is the hex output of `authorize`. When it is absent the wallet
/// authorizes itself, which only succeeds if the wallet is the ledger's signer.
pub async fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    amount: Balance,
    signature: Option<&str>,
) -> Result<Receipt, WalletError> {
    let sender = load_wallet(wallet_path)?.authorizer()?;
    let client = NodeClient::new(&config.node);

    let signature = match signature {
        Some(raw) => Bytes::from(
            hex::decode(raw.trim_start_matches("0x"))
                .map_err(|e| WalletError::WalletError(format!("Invalid signature hex: {}", e)))?,
        ),
        None => sender.authorize(sender.address(), amount)?,
    };

    let receipt = client
        .send(&sender, Call::Withdraw { amount, signature })
        .await?;
    info!("Withdrew {} to {:?}", amount, sender.address());

    Ok(receipt)
}
