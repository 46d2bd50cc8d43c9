//! RocksDB persistence for the runtime state.
//!
//! The token, ledger and nonce state lives under one key and is replaced on
//! every commit. Receipts are append-only and each gets its own key, so a
//! commit only writes the receipts it added.

use crate::errors::NodeError;
use custody_core::{MemoryToken, Receipt, Runtime};
use rocksdb::{Options, WriteBatch, DB};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

const STATE_KEY: &[u8] = b"runtime_state";
const RECEIPT_PREFIX: &[u8] = b"receipt:";

fn receipt_key(index: u64) -> Vec<u8> {
    let mut key = RECEIPT_PREFIX.to_vec();
    key.extend_from_slice(&index.to_be_bytes());
    key
}

/// Where the node keeps committed runtime state.
pub trait RuntimeStore {
    /// Loads the stored runtime with its receipts, if any.
    fn load(&self) -> Result<Option<Runtime<MemoryToken>>, NodeError>;

    /// Writes the runtime state and every receipt with an index of at least
    /// `from`, all or nothing.
    fn save(&self, runtime: &Runtime<MemoryToken>, from: u64) -> Result<(), NodeError>;
}

/// A wrapper around RocksDB holding the latest committed runtime.
#[derive(Clone)]
pub struct StateStore {
    /// The RocksDB instance
    db: Arc<Mutex<DB>>,
}

impl StateStore {
    /// Opens or creates a state store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, NodeError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path)?;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Loads the stored runtime, if any.
    pub fn load(&self) -> Result<Option<Runtime<MemoryToken>>, NodeError> {
        let db = self
            .db
            .lock()
            .map_err(|_| NodeError::StorageError("state store lock poisoned".to_string()))?;

        let mut runtime: Runtime<MemoryToken> = match db.get(STATE_KEY)? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => return Ok(None),
        };

        let mut receipts = Vec::new();
        while let Some(bytes) = db.get(receipt_key(receipts.len() as u64))? {
            let receipt: Receipt = bincode::deserialize(&bytes)?;
            receipts.push(receipt);
        }
        debug!("Loaded {} receipts", receipts.len());

        runtime.restore_receipts(receipts);
        Ok(Some(runtime))
    }

    /// Replaces the stored state with `runtime` and appends its receipts
    /// from index `from` onwards in a single write.
    pub fn save(&self, runtime: &Runtime<MemoryToken>, from: u64) -> Result<(), NodeError> {
        let mut batch = WriteBatch::default();

        let state = bincode::serialize(runtime)?;
        debug!("Persisting runtime state ({} bytes)", state.len());
        batch.put(STATE_KEY, state);

        for receipt in runtime.receipts(from) {
            batch.put(receipt_key(receipt.index), bincode::serialize(receipt)?);
        }

        self.db
            .lock()
            .map_err(|_| NodeError::StorageError("state store lock poisoned".to_string()))?
            .write(batch)?;
        Ok(())
    }
}

impl RuntimeStore for StateStore {
    fn load(&self) -> Result<Option<Runtime<MemoryToken>>, NodeError> {
        StateStore::load(self)
    }

    fn save(&self, runtime: &Runtime<MemoryToken>, from: u64) -> Result<(), NodeError> {
        StateStore::save(self, runtime, from)
    }
}
