//! Configuration for the node daemon.

use crate::errors::NodeError;
use anyhow::Result;
use custody_core::types::{parse_address, Address, Balance};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for the node daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// RPC configuration
    pub rpc: RpcConfig,
    /// Metrics configuration
    pub metrics: MetricsConfig,
    /// Storage configuration
    pub storage: StorageConfig,
    /// Genesis deployment, used when the store is empty
    pub genesis: GenesisConfig,
}

/// RPC configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Listen address for the RPC server
    pub listen_addr: String,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether to enable the metrics server
    pub enabled: bool,
    /// Listen address for the metrics server
    pub listen_addr: String,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the data directory
    pub data_dir: String,
}

/// Genesis deployment of the token and the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Chain id signed calls commit to
    pub chain_id: u64,
    /// Deploying account; becomes owner and initial signer
    pub deployer: String,
    /// Token name
    pub token_name: String,
    /// Token symbol
    pub token_symbol: String,
    /// Total token supply, in decimal, minted to the deployer
    pub supply: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig {
                listen_addr: "127.0.0.1:8545".to_string(),
            },
            metrics: MetricsConfig {
                enabled: false,
                listen_addr: "127.0.0.1:9090".to_string(),
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
            },
            genesis: GenesisConfig {
                chain_id: 31337,
                deployer: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
                token_name: "Token".to_string(),
                token_symbol: "TKN".to_string(),
                supply: "1000000000000000000000000".to_string(),
            },
        }
    }
}

impl NodeConfig {
    /// Loads configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl GenesisConfig {
    /// The deployer as an address.
    pub fn deployer_address(&self) -> Result<Address, NodeError> {
        parse_address(&self.deployer).ok_or_else(|| {
            NodeError::ConfigError(format!("Invalid deployer address: {}", self.deployer))
        })
    }

    /// The total supply as an integer.
    pub fn supply_amount(&self) -> Result<Balance, NodeError> {
        Balance::from_dec_str(&self.supply)
            .map_err(|e| NodeError::ConfigError(format!("Invalid supply {}: {:?}", self.supply, e)))
    }
}
