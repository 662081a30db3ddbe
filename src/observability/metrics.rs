//! Metrics collection.
//!
//! # Metrics
//! - `mint_wallet_connects_total` (counter): successful wallet connections
//! - `mint_tx_submitted_total` (counter): mint transactions broadcast
//! - `mint_tx_mined_total` (counter): mint transactions mined successfully
//! - `mint_tx_failed_total` (counter): mint transactions reverted/dropped/timed out
//! - `mint_events_observed_total` (counter): mint-completion events consumed
//! - `mint_rpc_errors_total` (counter, by op): provider RPC failures
//!
//! # Design Decisions
//! - Recording is a no-op unless a metrics recorder is installed by the host
//! - Low-overhead counter updates only; no histograms needed at this scale

use metrics::counter;

/// Record a successful wallet connection (handle bound).
pub fn record_wallet_connect() {
    counter!("mint_wallet_connects_total").increment(1);
}

/// Record a mint transaction broadcast.
pub fn record_mint_submitted() {
    counter!("mint_tx_submitted_total").increment(1);
}

/// Record a mint transaction mined successfully.
pub fn record_mint_mined() {
    counter!("mint_tx_mined_total").increment(1);
}

/// Record a mint failure (reverted, dropped, or timed out).
pub fn record_mint_failed() {
    counter!("mint_tx_failed_total").increment(1);
}

/// Record a consumed mint-completion event.
pub fn record_mint_event() {
    counter!("mint_events_observed_total").increment(1);
}

/// Record a provider RPC failure for the given operation.
pub fn record_rpc_error(op: &'static str) {
    counter!("mint_rpc_errors_total", "op" => op).increment(1);
}
