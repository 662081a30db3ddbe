//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check value ranges (timeouts > 0, chain id non-zero)
//! - Check that addresses and URLs actually parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: MintConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use alloy::primitives::Address;
use thiserror::Error;
use url::Url;

use crate::config::schema::MintConfig;

/// A single semantic configuration problem.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("contract.address is not a valid address: {0}")]
    ContractAddress(String),

    #[error("network.chain_id must be non-zero")]
    ChainIdZero,

    #[error("contract.event_poll_interval_ms must be greater than zero")]
    PollIntervalZero,

    #[error("contract.mint_timeout_secs must be greater than zero")]
    MintTimeoutZero,

    #[error("wallet.rpc_timeout_secs must be greater than zero")]
    RpcTimeoutZero,

    #[error("wallet.rpc_url is not a valid URL: {0}")]
    RpcUrl(String),

    #[error("wallet.private_key_env must not be empty")]
    KeyEnvEmpty,

    #[error("links.{field} is not a valid URL: {value}")]
    Link { field: &'static str, value: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &MintConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(ValidationError::ContractAddress(
            config.contract.address.clone(),
        ));
    }
    if config.network.chain_id == 0 {
        errors.push(ValidationError::ChainIdZero);
    }
    if config.contract.event_poll_interval_ms == 0 {
        errors.push(ValidationError::PollIntervalZero);
    }
    if config.contract.mint_timeout_secs == 0 {
        errors.push(ValidationError::MintTimeoutZero);
    }
    if config.wallet.rpc_timeout_secs == 0 {
        errors.push(ValidationError::RpcTimeoutZero);
    }
    if config.wallet.rpc_url.parse::<Url>().is_err() {
        errors.push(ValidationError::RpcUrl(config.wallet.rpc_url.clone()));
    }
    if config.wallet.private_key_env.trim().is_empty() {
        errors.push(ValidationError::KeyEnvEmpty);
    }

    for (field, value) in [
        ("collection_url", &config.links.collection_url),
        ("asset_base_url", &config.links.asset_base_url),
        ("explorer_tx_base_url", &config.links.explorer_tx_base_url),
    ] {
        if value.parse::<Url>().is_err() {
            errors.push(ValidationError::Link {
                field,
                value: value.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&MintConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = MintConfig::default();
        config.contract.address = "not-an-address".to_string();
        config.network.chain_id = 0;
        config.contract.event_poll_interval_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_bad_urls() {
        let mut config = MintConfig::default();
        config.links.collection_url = "not a url".to_string();
        config.wallet.rpc_url = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Link { field, .. } if *field == "collection_url")));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::RpcUrl(_))));
    }
}
