//! Metrics for the node daemon.

use anyhow::Result;
use custody_core::{Call, RuntimeError};
use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_histogram, Counter, Encoder, Histogram, HistogramOpts, Opts,
    TextEncoder,
};
use std::net::SocketAddr;
use tracing::warn;
use warp::Filter;

lazy_static! {
    /// Counter for committed deposits.
    pub static ref DEPOSIT_COUNTER: Counter = register_counter!(
        Opts::new("deposits_total", "Total number of committed deposits")
    )
    .expect("deposits_total registers once");

    /// Counter for committed withdrawals.
    pub static ref WITHDRAWAL_COUNTER: Counter = register_counter!(
        Opts::new("withdrawals_total", "Total number of committed withdrawals")
    )
    .expect("withdrawals_total registers once");

    /// Counter for rejected transactions.
    pub static ref REJECTED_COUNTER: Counter = register_counter!(
        Opts::new("rejected_transactions_total", "Total number of rejected transactions")
    )
    .expect("rejected_transactions_total registers once");

    /// Histogram for transaction processing time.
    pub static ref TRANSACTION_TIME: Histogram = register_histogram!(
        HistogramOpts::new(
            "transaction_processing_time_seconds",
            "Time to apply and persist a transaction"
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0])
    )
    .expect("transaction_processing_time_seconds registers once");
}

/// Records the outcome of a submitted call.
pub fn record_outcome(call: &Call, outcome: &Result<(), &RuntimeError>) {
    match (call, outcome) {
        (_, Err(_)) => REJECTED_COUNTER.inc(),
        (Call::Deposit { .. }, Ok(())) => DEPOSIT_COUNTER.inc(),
        (Call::Withdraw { .. }, Ok(())) => WITHDRAWAL_COUNTER.inc(),
        _ => {}
    }
}

/// Renders all registered metrics in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Starts the metrics server.
pub async fn start_metrics_server(addr: SocketAddr) -> Result<()> {
    let metrics_route = warp::path("metrics").map(render);

    tokio::spawn(async move {
        warp::serve(metrics_route).run(addr).await;
    });

    Ok(())
}
