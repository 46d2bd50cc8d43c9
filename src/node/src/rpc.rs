//! JSON-RPC server for the node daemon.

use crate::storage::StateStore;
use crate::{submit, SharedRuntime};
use crate::errors::NodeError;
use anyhow::Result;
use custody_core::types::{parse_address, Address};
use custody_core::{MemoryToken, Runtime, SignedCall};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};
use warp::{Filter, Rejection, Reply};

/// Maximum accepted request body.
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Method to call
    pub method: String,
    /// Parameters for the method
    #[serde(default)]
    pub params: serde_json::Value,
    /// Request ID
    pub id: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Result of the method call
    pub result: Option<serde_json::Value>,
    /// Error, if any
    pub error: Option<JsonRpcError>,
    /// Request ID
    pub id: serde_json::Value,
}

/// JSON-RPC error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }
}

impl From<NodeError> for JsonRpcError {
    fn from(error: NodeError) -> Self {
        match error {
            // Reverts carry the revert reason as the message
            NodeError::RuntimeError(e) => Self {
                code: -32000,
                message: e.to_string(),
                data: None,
            },
            other => Self::internal(other.to_string()),
        }
    }
}

/// State for the RPC server.
pub struct RpcState {
    /// The runtime
    runtime: SharedRuntime,
    /// Where committed state is persisted
    store: StateStore,
}

impl RpcState {
    /// Creates the RPC state.
    pub fn new(runtime: SharedRuntime, store: StateStore) -> Self {
        Self { runtime, store }
    }

    fn read<R>(&self, f: impl FnOnce(&Runtime<MemoryToken>) -> R) -> Result<R, JsonRpcError> {
        let runtime = self
            .runtime
            .lock()
            .map_err(|_| JsonRpcError::internal("runtime lock poisoned"))?;
        Ok(f(&runtime))
    }
}

/// Builds the `/rpc` route.
pub fn rpc_filter(
    state: Arc<RpcState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("rpc")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state))
        .and_then(handle_rpc)
}

/// Starts the JSON-RPC server.
pub async fn start_rpc_server(addr: SocketAddr, state: Arc<RpcState>) -> Result<()> {
    let rpc_route = rpc_filter(state);

    info!("JSON-RPC listening on {}", addr);
    tokio::spawn(async move {
        warp::serve(rpc_route).run(addr).await;
    });

    Ok(())
}

/// Provides the RPC state to handlers.
fn with_state(
    state: Arc<RpcState>,
) -> impl Filter<Extract = (Arc<RpcState>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Handles a JSON-RPC request.
async fn handle_rpc(
    request: JsonRpcRequest,
    state: Arc<RpcState>,
) -> Result<impl Reply, Rejection> {
    let response = handle_request(&state, &request);
    Ok(warp::reply::json(&response))
}

/// Dispatches a request to its method handler.
pub fn handle_request(state: &RpcState, request: &JsonRpcRequest) -> JsonRpcResponse {
    debug!("RPC {} {}", request.method, request.params);

    let result = match request.method.as_str() {
        "balances" => handle_balances(&request.params, state),
        "signerAddress" => state.read(|r| address_json(r.signer_address())),
        "owner" => state.read(|r| address_json(r.owner())),
        "tokenAddress" => state.read(|r| address_json(r.token_address())),
        "ledgerAddress" => state.read(|r| address_json(r.ledger().address())),
        "chainId" => state.read(|r| serde_json::json!(r.chain_id())),
        "tokenBalance" => handle_token_balance(&request.params, state),
        "allowance" => handle_allowance(&request.params, state),
        "nonce" => handle_nonce(&request.params, state),
        "receipts" => handle_receipts(&request.params, state),
        "sendTransaction" => handle_send_transaction(&request.params, state),
        _ => Err(JsonRpcError {
            code: -32601,
            message: "Method not found".to_string(),
            data: None,
        }),
    };

    match result {
        Ok(result) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id: request.id.clone(),
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: request.id.clone(),
        },
    }
}

fn address_json(address: Address) -> serde_json::Value {
    serde_json::json!(format!("{:?}", address))
}

fn param<'a>(params: &'a serde_json::Value, index: usize) -> Result<&'a serde_json::Value, JsonRpcError> {
    params
        .as_array()
        .and_then(|params| params.get(index))
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Missing parameter {}", index)))
}

fn param_address(params: &serde_json::Value, index: usize) -> Result<Address, JsonRpcError> {
    let raw = param(params, index)?
        .as_str()
        .ok_or_else(|| JsonRpcError::invalid_params("Invalid address"))?;
    parse_address(raw).ok_or_else(|| JsonRpcError::invalid_params(format!("Invalid address: {}", raw)))
}

/// Handles the balances method.
fn handle_balances(
    params: &serde_json::Value,
    state: &RpcState,
) -> Result<serde_json::Value, JsonRpcError> {
    let account = param_address(params, 0)?;
    state.read(|r| serde_json::json!(r.balances(account).to_string()))
}

/// Handles the tokenBalance method.
fn handle_token_balance(
    params: &serde_json::Value,
    state: &RpcState,
) -> Result<serde_json::Value, JsonRpcError> {
    let account = param_address(params, 0)?;
    state.read(|r| serde_json::json!(r.token_balance(account).to_string()))
}

/// Handles the allowance method.
fn handle_allowance(
    params: &serde_json::Value,
    state: &RpcState,
) -> Result<serde_json::Value, JsonRpcError> {
    let owner = param_address(params, 0)?;
    let spender = param_address(params, 1)?;
    state.read(|r| serde_json::json!(r.allowance(owner, spender).to_string()))
}

/// Handles the nonce method.
fn handle_nonce(
    params: &serde_json::Value,
    state: &RpcState,
) -> Result<serde_json::Value, JsonRpcError> {
    let account = param_address(params, 0)?;
    state.read(|r| serde_json::json!(r.nonce(account)))
}

/// Handles the receipts method. The optional parameter is the first index.
fn handle_receipts(
    params: &serde_json::Value,
    state: &RpcState,
) -> Result<serde_json::Value, JsonRpcError> {
    let from = match params.as_array().and_then(|params| params.first()) {
        Some(value) => value
            .as_u64()
            .ok_or_else(|| JsonRpcError::invalid_params("Invalid receipt index"))?,
        None => 0,
    };

    let receipts = state.read(|r| r.receipts(from).to_vec())?;
    serde_json::to_value(receipts).map_err(|e| JsonRpcError::internal(e.to_string()))
}

/// Handles the sendTransaction method.
fn handle_send_transaction(
    params: &serde_json::Value,
    state: &RpcState,
) -> Result<serde_json::Value, JsonRpcError> {
    let signed: SignedCall = serde_json::from_value(param(params, 0)?.clone())
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid transaction: {}", e)))?;

    match submit(&state.runtime, &state.store, &signed) {
        Ok(receipt) => {
            info!("Committed {} from {:?} as #{}", receipt.call, receipt.caller, receipt.index);
            serde_json::to_value(receipt).map_err(|e| JsonRpcError::internal(e.to_string()))
        }
        Err(e) => {
            warn!("Transaction rejected: {}", e);
            Err(e.into())
        }
    }
}
