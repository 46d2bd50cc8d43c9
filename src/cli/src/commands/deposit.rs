//! Deposit command for the CLI.

use super::load_wallet;
use crate::client::NodeClient;
use crate::config::WalletConfig;
use crate::errors::WalletError;
use custody_core::{Balance, Call, Receipt};
use std::path::Path;
use tracing::{debug, info};

/// Deposits `amount` tokens into the ledger.
///
/// With `approve` set, the ledger is first approved for any shortfall in the
/// current allowance.
pub async fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    amount: Balance,
    approve: bool,
) -> Result<Receipt, WalletError> {
    let sender = load_wallet(wallet_path)?.authorizer()?;
    let client = NodeClient::new(&config.node);

    if approve {
        let ledger = client.ledger_address().await?;
        let allowance = client.allowance(sender.address(), ledger).await?;
        debug!("Current allowance for ledger: {}", allowance);

        if allowance < amount {
            let receipt = client
                .send(&sender, Call::Approve { spender: ledger, amount })
                .await?;
            info!("Approved ledger in receipt #{}", receipt.index);
        }
    }

    let receipt = client.send(&sender, Call::Deposit { amount }).await?;
    info!("Deposited {} from {:?}", amount, sender.address());

    Ok(receipt)
}
