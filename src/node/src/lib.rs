//! Node daemon hosting the custody ledger.

pub mod config;
pub mod errors;
pub mod metrics;
pub mod rpc;
pub mod storage;

use config::GenesisConfig;
use custody_core::{MemoryToken, Receipt, Runtime, RuntimeError, SignedCall};
use errors::NodeError;
use std::sync::{Arc, Mutex};
use storage::RuntimeStore;
use tracing::{debug, error, info};

/// The runtime shared between RPC handlers. The mutex serializes every call.
pub type SharedRuntime = Arc<Mutex<Runtime<MemoryToken>>>;

/// Loads the persisted runtime, or deploys genesis when the store is empty.
pub fn load_or_genesis<S: RuntimeStore + ?Sized>(
    store: &S,
    genesis: &GenesisConfig,
) -> Result<Runtime<MemoryToken>, NodeError> {
    if let Some(runtime) = store.load()? {
        info!(
            "Loaded ledger {:?} with {} receipts",
            runtime.ledger().address(),
            runtime.receipts(0).len()
        );
        return Ok(runtime);
    }

    let deployer = genesis.deployer_address()?;
    let runtime = Runtime::genesis(
        genesis.chain_id,
        deployer,
        &genesis.token_name,
        &genesis.token_symbol,
        genesis.supply_amount()?,
    );
    info!(
        "Deployed genesis: token {:?}, ledger {:?}, owner {:?}",
        runtime.token_address(),
        runtime.ledger().address(),
        deployer
    );

    store.save(&runtime, 0)?;
    Ok(runtime)
}

/// Applies a signed call and persists the result.
///
/// The call runs against a copy of the runtime. The copy replaces the shared
/// runtime only once it is stored, so a failed write leaves no trace.
pub fn submit<S: RuntimeStore + ?Sized>(
    runtime: &SharedRuntime,
    store: &S,
    signed: &SignedCall,
) -> Result<Receipt, NodeError> {
    let timer = metrics::TRANSACTION_TIME.start_timer();

    let mut runtime = runtime
        .lock()
        .map_err(|_| NodeError::RpcError("runtime lock poisoned".to_string()))?;

    debug!("Submitting {} with nonce {}", signed.call, signed.nonce);
    let mut next = runtime.clone();
    let from = next.receipt_count();
    let result = next.apply_signed(signed);

    // A reverted call still consumes the sender's nonce
    if matches!(result, Ok(_) | Err(RuntimeError::Reverted(_))) {
        if let Err(e) = store.save(&next, from) {
            error!("Failed to persist runtime state, dropping call: {}", e);
            return Err(e);
        }
        *runtime = next;
    }

    metrics::record_outcome(&signed.call, &result.as_ref().map(|_| ()));
    timer.observe_duration();
    Ok(result?)
}
