//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mint
//! client. All types derive Serde traits for deserialization from config
//! files, and every section has defaults matching the reference deployment so
//! a minimal (or absent) config file still yields a working client.

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the mint client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MintConfig {
    /// Wallet provider settings (RPC transport, signing key source).
    pub wallet: WalletConfig,

    /// Target network settings.
    pub network: NetworkConfig,

    /// Deployed contract settings.
    pub contract: ContractConfig,

    /// External link settings (collection listing, asset pages, explorer).
    pub links: LinkConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Wallet provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint URL the wallet provider talks to.
    pub rpc_url: String,

    /// Name of the environment variable holding the hex signing key.
    ///
    /// The key itself is never placed in the config file.
    pub private_key_env: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            private_key_env: "MINT_WALLET_PRIVATE_KEY".to_string(),
            rpc_timeout_secs: 10,
        }
    }
}

/// Target network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Chain ID the client requires before any mutating action (4 = Rinkeby).
    pub chain_id: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { chain_id: 4 }
    }
}

/// Deployed contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of the deployed token contract.
    pub address: String,

    /// Polling interval for the mint event subscription, in milliseconds.
    pub event_poll_interval_ms: u64,

    /// Number of block confirmations before an event is delivered.
    pub confirmation_blocks: u32,

    /// Maximum time to wait for a mint transaction to be mined, in seconds.
    pub mint_timeout_secs: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: "0xa40e689b8F5b11Ce953694C51401DD49F44D5091".to_string(),
            event_poll_interval_ms: 4000,
            confirmation_blocks: 0,
            mint_timeout_secs: 120,
        }
    }
}

/// External link configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Listing page for the whole collection.
    pub collection_url: String,

    /// Base URL for individual asset pages; the contract address and token id
    /// are appended as path segments.
    pub asset_base_url: String,

    /// Base URL for transaction pages on the block explorer.
    pub explorer_tx_base_url: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            collection_url: "https://testnets.opensea.io/collection/staa-squares".to_string(),
            asset_base_url: "https://testnets.opensea.io/assets".to_string(),
            explorer_tx_base_url: "https://rinkeby.etherscan.io/tx".to_string(),
        }
    }
}

impl LinkConfig {
    /// The collection listing URL.
    pub fn collection(&self) -> Result<Url, url::ParseError> {
        self.collection_url.parse()
    }

    /// Asset page URL for one minted token.
    pub fn asset(&self, contract: Address, token_id: u64) -> Result<Url, url::ParseError> {
        format!(
            "{}/{}/{}",
            self.asset_base_url.trim_end_matches('/'),
            contract,
            token_id
        )
        .parse()
    }

    /// Explorer page URL for a transaction.
    pub fn transaction(&self, tx_hash: TxHash) -> Result<Url, url::ParseError> {
        format!(
            "{}/{}",
            self.explorer_tx_base_url.trim_end_matches('/'),
            tx_hash
        )
        .parse()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter, overridable via `RUST_LOG`.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "mint_client=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn default_config_targets_reference_deployment() {
        let config = MintConfig::default();
        assert_eq!(config.network.chain_id, 4);
        assert_eq!(
            config.contract.address,
            "0xa40e689b8F5b11Ce953694C51401DD49F44D5091"
        );
        assert_eq!(config.wallet.rpc_timeout_secs, 10);
        assert!(config.contract.event_poll_interval_ms > 0);
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: MintConfig = toml::from_str("[network]\nchain_id = 1\n").unwrap();
        assert_eq!(config.network.chain_id, 1);
        assert_eq!(config.contract.mint_timeout_secs, 120);
    }

    #[test]
    fn asset_link_contains_contract_and_token_id() {
        let links = LinkConfig::default();
        let contract = address!("a40e689b8f5b11ce953694c51401dd49f44d5091");
        let url = links.asset(contract, 13).unwrap();
        let rendered = url.to_string();
        assert!(rendered.starts_with("https://testnets.opensea.io/assets/0x"));
        assert!(rendered.ends_with("/13"));
    }

    #[test]
    fn transaction_link_appends_hash() {
        let links = LinkConfig::default();
        let url = links.transaction(TxHash::ZERO).unwrap();
        assert!(url
            .to_string()
            .starts_with("https://rinkeby.etherscan.io/tx/0x"));
    }
}
