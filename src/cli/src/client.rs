//! JSON-RPC client for the custody node.

use crate::errors::WalletError;
use custody_core::runtime::sign_call;
use custody_core::types::parse_address;
use custody_core::{Address, Authorizer, Balance, Call, Receipt};
use tracing::debug;

/// A thin JSON-RPC client bound to one node.
pub struct NodeClient {
    rpc_url: String,
    client: reqwest::Client,
}

impl NodeClient {
    /// Creates a client for `node_url`, appending `/rpc` when missing.
    pub fn new(node_url: &str) -> Self {
        let node_url = node_url.trim_end_matches('/');
        let rpc_url = if node_url.ends_with("/rpc") {
            node_url.to_string()
        } else {
            format!("{}/rpc", node_url)
        };

        Self {
            rpc_url,
            client: reqwest::Client::new(),
        }
    }

    /// The URL requests are posted to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Calls `method` and returns its result.
    pub async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        debug!("RPC request to {}: {}", self.rpc_url, request);

        let response: serde_json::Value = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        parse_response(method, response)
    }

    async fn call_for_address(&self, method: &str) -> Result<Address, WalletError> {
        let result = self.call(method, serde_json::json!([])).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| WalletError::NodeRequestFailed(format!("{} returned {}", method, result)))?;
        parse_address(raw).ok_or_else(|| WalletError::InvalidAddress(raw.to_string()))
    }

    async fn call_for_balance(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Balance, WalletError> {
        let result = self.call(method, params).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| WalletError::NodeRequestFailed(format!("{} returned {}", method, result)))?;
        Balance::from_dec_str(raw).map_err(|e| WalletError::InvalidAmount(format!("{}: {:?}", raw, e)))
    }

    /// The chain id signed calls must commit to.
    pub async fn chain_id(&self) -> Result<u64, WalletError> {
        let result = self.call("chainId", serde_json::json!([])).await?;
        result
            .as_u64()
            .ok_or_else(|| WalletError::NodeRequestFailed(format!("chainId returned {}", result)))
    }

    /// The next nonce for `account`.
    pub async fn nonce(&self, account: Address) -> Result<u64, WalletError> {
        let result = self
            .call("nonce", serde_json::json!([format!("{:?}", account)]))
            .await?;
        result
            .as_u64()
            .ok_or_else(|| WalletError::NodeRequestFailed(format!("nonce returned {}", result)))
    }

    /// The ledger's own address.
    pub async fn ledger_address(&self) -> Result<Address, WalletError> {
        self.call_for_address("ledgerAddress").await
    }

    /// The current authorized signer.
    pub async fn signer_address(&self) -> Result<Address, WalletError> {
        self.call_for_address("signerAddress").await
    }

    /// The deposited balance of `account`.
    pub async fn balances(&self, account: Address) -> Result<Balance, WalletError> {
        self.call_for_balance("balances", serde_json::json!([format!("{:?}", account)]))
            .await
    }

    /// The token balance of `account`.
    pub async fn token_balance(&self, account: Address) -> Result<Balance, WalletError> {
        self.call_for_balance("tokenBalance", serde_json::json!([format!("{:?}", account)]))
            .await
    }

    /// The allowance from `owner` to `spender`.
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<Balance, WalletError> {
        self.call_for_balance(
            "allowance",
            serde_json::json!([format!("{:?}", owner), format!("{:?}", spender)]),
        )
        .await
    }

    /// Signs `call` with `sender`'s next nonce and submits it.
    pub async fn send(&self, sender: &Authorizer, call: Call) -> Result<Receipt, WalletError> {
        let chain_id = self.chain_id().await?;
        let nonce = self.nonce(sender.address()).await?;

        let signed = sign_call(sender, chain_id, nonce, call)
            .map_err(|e| WalletError::TransactionError(e.to_string()))?;
        let result = self
            .call("sendTransaction", serde_json::json!([signed]))
            .await?;

        Ok(serde_json::from_value(result)?)
    }
}

/// Extracts the result of a JSON-RPC response, turning errors into
/// [`WalletError`]s. Reverts (`-32000`) become transaction errors.
pub fn parse_response(method: &str, response: serde_json::Value) -> Result<serde_json::Value, WalletError> {
    if let Some(error) = response.get("error") {
        if !error.is_null() {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string();
            let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or_default();
            if code == -32000 {
                return Err(WalletError::TransactionError(message));
            }
            return Err(WalletError::NodeRequestFailed(format!("{}: {}", method, message)));
        }
    }

    response
        .get("result")
        .cloned()
        .ok_or_else(|| WalletError::NodeRequestFailed(format!("No result in response to {}", method)))
}
