//! Client for a custody ledger deployed on an EVM chain.

use crate::bindings::{parse_ledger_log, LedgerContract, TokenContract};
use crate::errors::BridgeError;
use custody_core::{Authorizer, LedgerEvent};
use ethers::abi::Detokenize;
use ethers::contract::ContractCall;
use ethers::{
    core::types::{Address, Bytes, Filter, TransactionReceipt, U256},
    middleware::{Middleware, SignerMiddleware},
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
};
use log::{debug, info};
use std::str::FromStr;
use std::sync::Arc;

/// A client that deposits into and withdraws from a deployed ledger.
pub struct CustodyClient<M: Middleware> {
    /// The ledger contract
    ledger: LedgerContract<M>,
    /// The token the ledger holds
    token: TokenContract<M>,
    /// The provider for the EVM chain
    provider: Arc<M>,
}

impl<M: Middleware + 'static> CustodyClient<M> {
    /// Binds the ledger at `ledger_address` and the token it reports.
    pub async fn new(provider: Arc<M>, ledger_address: &str) -> Result<Self, BridgeError> {
        let ledger_address = Address::from_str(ledger_address).map_err(|e| {
            BridgeError::InvalidAddress(format!("Invalid ledger address: {}", e))
        })?;

        let ledger = LedgerContract::<M>::new(ledger_address, provider.clone())?;
        let token_address = ledger
            .token()?
            .call()
            .await
            .map_err(|e| BridgeError::ContractError(format!("Failed to read token: {}", e)))?;
        let token = TokenContract::<M>::new(token_address, provider.clone())?;
        debug!("Ledger {:?} holds token {:?}", ledger_address, token_address);

        Ok(Self {
            ledger,
            token,
            provider,
        })
    }

    /// The address transactions are sent from.
    pub fn sender(&self) -> Result<Address, BridgeError> {
        self.provider
            .default_sender()
            .ok_or_else(|| BridgeError::EthereumError("Provider has no default sender".to_string()))
    }

    /// Deposits `amount` tokens, approving the ledger first when the current
    /// allowance does not cover it.
    pub async fn deposit(&self, amount: U256) -> Result<TransactionReceipt, BridgeError> {
        let sender = self.sender()?;
        let allowance = self.allowance(sender).await?;

        if allowance < amount {
            info!("Approving ledger {:?} for {}", self.ledger.address(), amount);
            send(self.token.approve(self.ledger.address(), amount)?, "approve").await?;
        }

        info!("Depositing {} from {:?}", amount, sender);
        send(self.ledger.deposit(amount)?, "deposit").await
    }

    /// Withdraws `amount` tokens with an authorization obtained from the signer.
    pub async fn withdraw(
        &self,
        amount: U256,
        signature: Bytes,
    ) -> Result<TransactionReceipt, BridgeError> {
        info!("Withdrawing {}", amount);
        send(self.ledger.withdraw(amount, signature)?, "withdraw").await
    }

    /// Authorizes a withdrawal for the sender with `authorizer` and submits it.
    pub async fn withdraw_authorized(
        &self,
        authorizer: &Authorizer,
        amount: U256,
    ) -> Result<TransactionReceipt, BridgeError> {
        let signature = authorizer.authorize(self.sender()?, amount)?;
        self.withdraw(amount, signature).await
    }

    /// Replaces the authorized signer. Reverts unless the sender is the owner.
    pub async fn set_signer_address(
        &self,
        signer: Address,
    ) -> Result<TransactionReceipt, BridgeError> {
        info!("Setting signer to {:?}", signer);
        send(self.ledger.set_signer_address(signer)?, "setSignerAddress").await
    }

    /// Deposited balance of `account`.
    pub async fn balances(&self, account: Address) -> Result<U256, BridgeError> {
        call(self.ledger.balances(account)?, "balances").await
    }

    pub async fn signer_address(&self) -> Result<Address, BridgeError> {
        call(self.ledger.signer_address()?, "signerAddress").await
    }

    pub async fn owner(&self) -> Result<Address, BridgeError> {
        call(self.ledger.owner()?, "owner").await
    }

    /// Token balance of `account`.
    pub async fn token_balance(&self, account: Address) -> Result<U256, BridgeError> {
        call(self.token.balance_of(account)?, "balanceOf").await
    }

    /// Allowance `owner` has granted the ledger.
    pub async fn allowance(&self, owner: Address) -> Result<U256, BridgeError> {
        call(self.token.allowance(owner, self.ledger.address())?, "allowance").await
    }

    /// Fetches `Deposit` and `Withdraw` events from `from_block` onwards.
    pub async fn ledger_events(&self, from_block: u64) -> Result<Vec<LedgerEvent>, BridgeError> {
        let filter = Filter::new()
            .address(self.ledger.address())
            .from_block(from_block);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| BridgeError::EthereumError(format!("Failed to fetch logs: {}", e)))?;
        debug!("Fetched {} ledger logs", logs.len());

        let mut events = Vec::new();
        for log in &logs {
            if let Some(event) = parse_ledger_log(self.ledger.abi(), log)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}

/// Sends a transaction and waits for it to be mined.
async fn send<M: Middleware + 'static, D: Detokenize>(
    call: ContractCall<M, D>,
    name: &str,
) -> Result<TransactionReceipt, BridgeError> {
    let pending_tx = call
        .send()
        .await
        .map_err(|e| BridgeError::ContractError(format!("{} reverted: {}", name, e)))?;

    pending_tx
        .await
        .map_err(|e| BridgeError::TransactionError(format!("Transaction failed: {}", e)))?
        .ok_or_else(|| BridgeError::TransactionError("Transaction receipt not found".to_string()))
}

async fn call<M: Middleware + 'static, D: Detokenize>(
    call: ContractCall<M, D>,
    name: &str,
) -> Result<D, BridgeError> {
    call.call()
        .await
        .map_err(|e| BridgeError::ContractError(format!("Failed to call {}: {}", name, e)))
}

/// Creates a client that signs with a local private key.
pub async fn connect_with_key(
    rpc_url: &str,
    ledger_address: &str,
    private_key: &str,
) -> Result<CustodyClient<SignerMiddleware<Provider<Http>, LocalWallet>>, BridgeError> {
    let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
        BridgeError::EthereumError(format!("Failed to create provider: {}", e))
    })?;

    let chain_id = provider
        .get_chainid()
        .await
        .map_err(|e| BridgeError::EthereumError(format!("Failed to get chain id: {}", e)))?;

    let wallet = private_key
        .parse::<LocalWallet>()
        .map_err(|e| BridgeError::SignatureError(format!("Invalid private key: {}", e)))?
        .with_chain_id(chain_id.as_u64());

    let signer = SignerMiddleware::new(provider, wallet);
    CustodyClient::new(Arc::new(signer), ledger_address).await
}
