//! The wallet provider boundary.

use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ContractConfig, WalletConfig};
use crate::contract::{ContractError, MintContract};
use crate::network::ChainId;
use crate::wallet::injected::InjectedWallet;

/// Errors raised at the wallet boundary.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The user declined the authorization prompt.
    #[error("authorization request rejected")]
    UserRejected,

    /// No account has been authorized yet; an active request is required.
    #[error("no authorized account")]
    NotAuthorized,

    /// Signing key missing or malformed.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// The configured RPC endpoint does not parse.
    #[error("invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Contract binding failed.
    #[error(transparent)]
    Bind(#[from] ContractError),
}

/// Capabilities of a wallet provider: network identity, account
/// authorization, and signer-bound contract handles.
///
/// Account queries follow the passive/active split of the underlying wallet
/// protocol: [`accounts`](WalletProvider::accounts) never prompts the user,
/// [`request_accounts`](WalletProvider::request_accounts) may.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// The chain the provider is currently connected to. Read-only; may be
    /// called at any time.
    async fn chain_id(&self) -> Result<ChainId, WalletError>;

    /// Accounts already authorized for this client. Passive; an empty list
    /// means "not yet authorized".
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Request account authorization. Active; fails with
    /// [`WalletError::UserRejected`] if the user declines.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Derive a signing capability scoped to the first authorized account and
    /// bind the contract to it. Pure construction, no network call.
    fn bind_contract(&self, config: &ContractConfig) -> Result<Box<dyn MintContract>, WalletError>;
}

/// Look for a usable wallet provider.
///
/// Fails soft: a missing or unusable signing key yields `None`, and the
/// caller surfaces an instruction to the user instead of crashing.
pub fn detect(config: &WalletConfig) -> Option<Arc<dyn WalletProvider>> {
    match InjectedWallet::from_env(config) {
        Ok(wallet) => Some(Arc::new(wallet)),
        Err(WalletError::InvalidKey(reason)) => {
            tracing::debug!(%reason, "no wallet provider available");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "wallet provider present but unusable");
            None
        }
    }
}
