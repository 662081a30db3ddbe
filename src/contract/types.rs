//! Contract-boundary types and error definitions.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during contract operations.
#[derive(Debug, Error)]
pub enum ContractError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request or confirmation wait timed out.
    #[error("timed out after {0} seconds")]
    Timeout(u64),

    /// Transaction was reverted on-chain.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// Transaction disappeared from the mempool.
    #[error("transaction dropped")]
    Dropped,

    /// The configured contract address does not parse.
    #[error("invalid contract address: {0}")]
    InvalidAddress(String),
}

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

/// A mint-completion event decoded from the chain.
///
/// Consumed once per occurrence; not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEvent {
    /// Account the new token was minted to.
    pub minter: Address,
    /// Identifier of the newly minted token.
    pub token_id: u64,
}
