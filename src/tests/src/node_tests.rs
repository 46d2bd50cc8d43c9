//! Tests for the node crate.

#![cfg(test)]

use custody_core::runtime::sign_call;
use custody_core::{Authorizer, Balance, Call};
use custody_node::config::NodeConfig;
use custody_node::rpc::{handle_request, JsonRpcRequest, RpcState};
use custody_node::storage::StateStore;
use custody_node::{load_or_genesis, metrics, submit, SharedRuntime};
use serial_test::serial;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const OWNER_KEY: &str = "0123456789012345678901234567890123456789012345678901234567890123";
const DEPOSITOR_KEY: &str = "1111111111111111111111111111111111111111111111111111111111111111";

fn config_for(owner: &Authorizer) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.genesis.deployer = format!("{:?}", owner.address());
    config.genesis.supply = "1000000".to_string();
    config
}

fn open(path: &Path, config: &NodeConfig) -> (SharedRuntime, StateStore) {
    let store = StateStore::new(path).unwrap();
    let runtime = load_or_genesis(&store, &config.genesis).unwrap();
    (Arc::new(Mutex::new(runtime)), store)
}

fn rpc(state: &RpcState, method: &str, params: serde_json::Value) -> serde_json::Value {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: serde_json::json!(1),
    };
    let response = handle_request(state, &request);
    if let Some(error) = response.error {
        panic!("{} failed: {} ({})", method, error.message, error.code);
    }
    response.result.unwrap()
}

/// Tests that committed state and nonces survive a restart.
#[test]
#[serial]
fn test_state_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state_db");
    let owner = Authorizer::from_key_hex(OWNER_KEY).unwrap();
    let depositor = Authorizer::from_key_hex(DEPOSITOR_KEY).unwrap();
    let config = config_for(&owner);

    {
        let (runtime, store) = open(&path, &config);
        let chain_id = runtime.lock().unwrap().chain_id();
        let ledger = runtime.lock().unwrap().ledger().address();

        let calls = vec![
            Call::Transfer { to: depositor.address(), amount: Balance::from(1000u64) },
            Call::Approve { spender: ledger, amount: Balance::from(1000u64) },
            Call::Deposit { amount: Balance::from(1000u64) },
        ];
        for (nonce, call) in calls.into_iter().enumerate() {
            let signed = sign_call(&owner, chain_id, nonce as u64, call).unwrap();
            submit(&runtime, &store, &signed).unwrap();
        }
    }

    // Genesis is not redeployed over existing state
    let (runtime, _store) = open(&path, &config);
    let runtime = runtime.lock().unwrap();
    assert_eq!(runtime.nonce(owner.address()), 3);
    assert_eq!(runtime.balances(owner.address()), Balance::from(1000u64));
    assert_eq!(runtime.token_balance(depositor.address()), Balance::from(1000u64));
    assert_eq!(runtime.receipts(0).len(), 3);
    assert!(runtime.is_solvent());
}

/// Tests the deposit and partial withdrawal scenario over JSON-RPC.
#[test]
#[serial]
fn test_rpc_withdrawal_scenario() {
    let dir = tempdir().unwrap();
    let owner = Authorizer::from_key_hex(OWNER_KEY).unwrap();
    let depositor = Authorizer::from_key_hex(DEPOSITOR_KEY).unwrap();
    let (runtime, store) = open(&dir.path().join("state_db"), &config_for(&owner));
    let state = RpcState::new(runtime.clone(), store);

    let chain_id = rpc(&state, "chainId", serde_json::json!([])).as_u64().unwrap();
    let ledger = rpc(&state, "ledgerAddress", serde_json::json!([]));
    let ledger = custody_core::types::parse_address(ledger.as_str().unwrap()).unwrap();
    let b = format!("{:?}", depositor.address());

    let send = |sender: &Authorizer, call: Call| {
        let nonce = rpc(&state, "nonce", serde_json::json!([format!("{:?}", sender.address())]))
            .as_u64()
            .unwrap();
        let signed = sign_call(sender, chain_id, nonce, call).unwrap();
        rpc(&state, "sendTransaction", serde_json::json!([signed]))
    };

    send(&owner, Call::Transfer { to: depositor.address(), amount: Balance::from(1000u64) });
    send(&depositor, Call::Approve { spender: ledger, amount: Balance::from(1000u64) });
    send(&depositor, Call::Deposit { amount: Balance::from(1000u64) });
    assert_eq!(rpc(&state, "balances", serde_json::json!([b])), serde_json::json!("1000"));

    let signature = owner.authorize(depositor.address(), Balance::from(500u64)).unwrap();
    let receipt = send(&depositor, Call::Withdraw { amount: Balance::from(500u64), signature });
    assert_eq!(receipt["index"], serde_json::json!(3));

    assert_eq!(rpc(&state, "balances", serde_json::json!([b])), serde_json::json!("500"));
    assert_eq!(rpc(&state, "tokenBalance", serde_json::json!([b])), serde_json::json!("500"));
    assert_eq!(
        rpc(&state, "allowance", serde_json::json!([b, format!("{:?}", ledger)])),
        serde_json::json!("0")
    );

    let rendered = metrics::render();
    assert!(rendered.contains("deposits_total"));
    assert!(rendered.contains("withdrawals_total"));
}
