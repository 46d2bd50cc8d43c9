//! Balance command for the CLI.

use super::{load_wallet, parse_account};
use crate::client::NodeClient;
use crate::config::WalletConfig;
use crate::errors::WalletError;
use custody_core::{Address, Balance};
use std::path::Path;
use tracing::debug;

/// Balances of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalances {
    /// The account queried
    pub account: Address,
    /// Tokens held by the ledger on the account's behalf
    pub deposited: Balance,
    /// Tokens held by the account itself
    pub token: Balance,
}

/// Runs the balance command for `account`, or for the wallet when absent.
pub async fn run<P: AsRef<Path>>(
    config: &WalletConfig,
    wallet_path: P,
    account: Option<&str>,
) -> Result<AccountBalances, WalletError> {
    let account = match account {
        Some(raw) => parse_account(raw)?,
        None => load_wallet(wallet_path)?.address()?,
    };
    debug!("Getting balances for {:?}", account);

    let client = NodeClient::new(&config.node);
    let deposited = client.balances(account).await?;
    let token = client.token_balance(account).await?;

    Ok(AccountBalances { account, deposited, token })
}
