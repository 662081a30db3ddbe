//! The process-local wallet provider.
//!
//! # Security
//! - Signing keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//!
//! In a browser this boundary is an injected wallet object that prompts the
//! user on authorization. In-process there is nobody to prompt: authorization
//! is granted by the active request and remembered for the lifetime of the
//! provider, which is exactly what the session layer is allowed to rely on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::time::timeout;
use url::Url;

use crate::config::{ContractConfig, WalletConfig};
use crate::contract::{ContractGateway, MintContract};
use crate::network::ChainId;
use crate::observability::metrics;
use crate::wallet::provider::{WalletError, WalletProvider};

/// Wallet provider backed by a JSON-RPC endpoint and a local signing key.
pub struct InjectedWallet {
    rpc_url: Url,
    signer: PrivateKeySigner,
    /// Read path; never carries the signer.
    provider: DynProvider,
    rpc_timeout: Duration,
    authorized: AtomicBool,
}

impl InjectedWallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// The key is parsed and held in memory only. It is never logged.
    pub fn from_private_key(private_key_hex: &str, config: &WalletConfig) -> Result<Self, WalletError> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::InvalidKey(format!("bad key format: {}", e)))?;

        let rpc_url: Url = config.rpc_url.parse().map_err(|e| WalletError::InvalidUrl {
            url: config.rpc_url.clone(),
            reason: format!("{}", e),
        })?;

        let provider = ProviderBuilder::new().connect_http(rpc_url.clone()).erased();

        tracing::info!(
            address = %signer.address(),
            rpc_url = %rpc_url,
            "wallet provider initialized"
        );

        Ok(Self {
            rpc_url,
            signer,
            provider,
            rpc_timeout: Duration::from_secs(config.rpc_timeout_secs),
            authorized: AtomicBool::new(false),
        })
    }

    /// Load the wallet from the environment variable named in the config.
    pub fn from_env(config: &WalletConfig) -> Result<Self, WalletError> {
        let private_key = std::env::var(&config.private_key_env).map_err(|_| {
            WalletError::InvalidKey(format!(
                "environment variable {} not set",
                config.private_key_env
            ))
        })?;

        Self::from_private_key(&private_key, config)
    }

    /// The address the signing key controls.
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl WalletProvider for InjectedWallet {
    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        let fut = self.provider.get_chain_id();
        match timeout(self.rpc_timeout, fut).await {
            Ok(Ok(id)) => Ok(ChainId::from(id)),
            Ok(Err(e)) => {
                metrics::record_rpc_error("chain_id");
                Err(WalletError::Rpc(e.to_string()))
            }
            Err(_) => Err(WalletError::Timeout(self.rpc_timeout.as_secs())),
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(vec![self.signer.address()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        // A local key has no prompt to decline; authorization is granted and
        // remembered for the provider's lifetime.
        self.authorized.store(true, Ordering::SeqCst);
        tracing::info!(address = %self.signer.address(), "account authorized");
        Ok(vec![self.signer.address()])
    }

    fn bind_contract(&self, config: &ContractConfig) -> Result<Box<dyn MintContract>, WalletError> {
        if !self.authorized.load(Ordering::SeqCst) {
            return Err(WalletError::NotAuthorized);
        }

        let wallet = EthereumWallet::from(self.signer.clone());
        let signing_provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone())
            .erased();

        let bound = ContractGateway::bind(config, self.rpc_timeout, signing_provider)?;
        Ok(Box::new(bound))
    }
}

impl std::fmt::Debug for InjectedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectedWallet")
            .field("address", &self.signer.address())
            .field("rpc_url", &self.rpc_url.as_str())
            .field("authorized", &self.authorized.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn wallet_from_private_key() {
        let wallet =
            InjectedWallet::from_private_key(TEST_PRIVATE_KEY, &WalletConfig::default()).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn wallet_accepts_0x_prefix() {
        let wallet = InjectedWallet::from_private_key(
            &format!("0x{}", TEST_PRIVATE_KEY),
            &WalletConfig::default(),
        )
        .unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn invalid_private_key_is_rejected() {
        let result = InjectedWallet::from_private_key("invalid_key", &WalletConfig::default());
        assert!(matches!(result, Err(WalletError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn accounts_are_empty_until_authorized() {
        let wallet =
            InjectedWallet::from_private_key(TEST_PRIVATE_KEY, &WalletConfig::default()).unwrap();

        assert!(wallet.accounts().await.unwrap().is_empty());

        let authorized = wallet.request_accounts().await.unwrap();
        assert_eq!(authorized, vec![wallet.address()]);
        assert_eq!(wallet.accounts().await.unwrap(), vec![wallet.address()]);
    }

    #[test]
    fn binding_requires_authorization() {
        let wallet =
            InjectedWallet::from_private_key(TEST_PRIVATE_KEY, &WalletConfig::default()).unwrap();
        let result = wallet.bind_contract(&ContractConfig::default());
        assert!(matches!(result, Err(WalletError::NotAuthorized)));
    }
}
