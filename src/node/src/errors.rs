//! Error types for the node daemon.

use custody_core::errors::RuntimeError;
use std::error::Error as StdError;
use std::fmt;

/// Errors that can occur in the node daemon.
#[derive(Debug)]
pub enum NodeError {
    /// Error when a call is rejected by the runtime.
    RuntimeError(RuntimeError),

    /// Error when a storage operation fails.
    StorageError(String),

    /// Error when serialization or deserialization fails.
    SerializationError(String),

    /// Error when an RPC operation fails.
    RpcError(String),

    /// Error when a metrics operation fails.
    MetricsError(String),

    /// Error when a configuration operation fails.
    ConfigError(String),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::RuntimeError(e) => write!(f, "{}", e),
            NodeError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            NodeError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            NodeError::RpcError(msg) => write!(f, "RPC error: {}", msg),
            NodeError::MetricsError(msg) => write!(f, "Metrics error: {}", msg),
            NodeError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl StdError for NodeError {}

impl From<RuntimeError> for NodeError {
    fn from(error: RuntimeError) -> Self {
        NodeError::RuntimeError(error)
    }
}

impl From<rocksdb::Error> for NodeError {
    fn from(error: rocksdb::Error) -> Self {
        NodeError::StorageError(error.to_string())
    }
}

impl From<bincode::Error> for NodeError {
    fn from(error: bincode::Error) -> Self {
        NodeError::SerializationError(error.to_string())
    }
}
