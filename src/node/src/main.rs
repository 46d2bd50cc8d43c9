//! Node daemon hosting the custody ledger.

use anyhow::Result;
use custody_node::config::NodeConfig;
use custody_node::metrics::start_metrics_server;
use custody_node::rpc::{start_rpc_server, RpcState};
use custody_node::storage::StateStore;
use custody_node::load_or_genesis;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command line arguments for the node daemon.
#[derive(Debug, StructOpt)]
#[structopt(name = "custody-node", about = "Custody ledger node")]
struct Opt {
    /// Path to the configuration file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Path to the data directory
    #[structopt(short, long, parse(from_os_str))]
    data_dir: Option<PathBuf>,

    /// JSON-RPC server address
    #[structopt(long)]
    rpc_addr: Option<String>,

    /// Enable metrics server
    #[structopt(long)]
    metrics: bool,

    /// Metrics server address
    #[structopt(long)]
    metrics_addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let opt = Opt::from_args();

    let mut config = match &opt.config {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::default(),
    };
    if let Some(rpc_addr) = opt.rpc_addr {
        config.rpc.listen_addr = rpc_addr;
    }
    if opt.metrics {
        config.metrics.enabled = true;
    }
    if let Some(metrics_addr) = opt.metrics_addr {
        config.metrics.listen_addr = metrics_addr;
    }

    let data_dir = opt.data_dir.unwrap_or_else(|| {
        if config.storage.data_dir.is_empty() {
            let mut dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            dir.push("custody");
            dir
        } else {
            PathBuf::from(&config.storage.data_dir)
        }
    });
    std::fs::create_dir_all(&data_dir)?;

    let mut state_path = data_dir.clone();
    state_path.push("state_db");
    info!("Opening state store at {}", state_path.display());
    let store = StateStore::new(state_path)?;

    let runtime = load_or_genesis(&store, &config.genesis)?;
    info!(
        "Ledger {:?} holding token {:?}, signer {:?}",
        runtime.ledger().address(),
        runtime.token_address(),
        runtime.signer_address()
    );
    let runtime = Arc::new(Mutex::new(runtime));

    let rpc_addr: SocketAddr = config.rpc.listen_addr.parse()?;
    start_rpc_server(rpc_addr, Arc::new(RpcState::new(runtime, store))).await?;

    if config.metrics.enabled {
        let metrics_addr: SocketAddr = config.metrics.listen_addr.parse()?;
        start_metrics_server(metrics_addr).await?;
        info!("Metrics listening on {}", metrics_addr);
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
