//! Contract binding and typed read/write operations.
//!
//! # Responsibilities
//! - Bind the deployed contract's interface to a signer-capable provider
//! - Read the current supply count
//! - Broadcast mint transactions and wait for inclusion
//! - Hand out scoped event subscriptions
//!
//! Binding is pure construction; no network call happens until an operation
//! is invoked on the handle.

use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tokio::time::{interval, timeout};

use crate::config::ContractConfig;
use crate::contract::events::{spawn_poll_task, MintEvents};
use crate::contract::types::{ContractError, ContractResult};
use crate::observability::metrics;

sol! {
    /// Current number of minted tokens.
    function getNFTCount() external view returns (uint256);

    /// Mint one token to the caller.
    function makeAnEpicNFT() external;

    /// Emitted once per successful mint.
    #[derive(Debug)]
    event NewEpicNFTMinted(address sender, uint256 tokenId);
}

/// Receipt poll cadence while waiting for inclusion.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Typed operations on the bound mint contract.
///
/// The production implementation is [`BoundContract`]; in-memory
/// implementations back the test suite.
#[async_trait]
pub trait MintContract: Send + Sync {
    /// Address of the deployment this handle is bound to.
    fn address(&self) -> Address;

    /// Current supply count as of the latest block the provider has observed.
    ///
    /// Idempotent; may be stale relative to concurrent mints until re-queried.
    async fn minted_count(&self) -> ContractResult<u64>;

    /// Broadcast a mint transaction. Returns the pending hash immediately,
    /// without waiting for inclusion.
    async fn submit_mint(&self) -> ContractResult<TxHash>;

    /// Suspend until the transaction is included in a block. Reverted,
    /// dropped, and timed-out transactions all surface as errors.
    async fn await_mined(&self, tx_hash: TxHash) -> ContractResult<()>;

    /// Register a scoped subscription for mint-completion events.
    fn subscribe(&self) -> ContractResult<MintEvents>;
}

/// Constructs contract handles from a signer-capable provider.
pub struct ContractGateway;

impl ContractGateway {
    /// Bind the contract interface to `provider`. Pure construction.
    pub fn bind(
        config: &ContractConfig,
        rpc_timeout: Duration,
        provider: DynProvider,
    ) -> ContractResult<BoundContract> {
        let address: Address = config
            .address
            .parse()
            .map_err(|_| ContractError::InvalidAddress(config.address.clone()))?;

        Ok(BoundContract {
            address,
            provider,
            rpc_timeout,
            mint_timeout: Duration::from_secs(config.mint_timeout_secs),
            poll_interval: Duration::from_millis(config.event_poll_interval_ms),
            confirmation_blocks: config.confirmation_blocks,
        })
    }
}

/// A contract handle bound to one signer-capable provider.
pub struct BoundContract {
    address: Address,
    provider: DynProvider,
    rpc_timeout: Duration,
    mint_timeout: Duration,
    poll_interval: Duration,
    confirmation_blocks: u32,
}

impl BoundContract {
    fn request(&self, input: Vec<u8>) -> TransactionRequest {
        use alloy::network::TransactionBuilder;

        TransactionRequest::default()
            .with_to(self.address)
            .with_input(Bytes::from(input))
    }
}

#[async_trait]
impl MintContract for BoundContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn minted_count(&self) -> ContractResult<u64> {
        let call = self.request(getNFTCountCall {}.abi_encode());

        let fut = self.provider.call(call);
        let bytes = match timeout(self.rpc_timeout, fut).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                metrics::record_rpc_error("get_nft_count");
                return Err(ContractError::Rpc(e.to_string()));
            }
            Err(_) => return Err(ContractError::Timeout(self.rpc_timeout.as_secs())),
        };

        let count = getNFTCountCall::abi_decode_returns(&bytes)
            .map_err(|e| ContractError::Rpc(format!("bad getNFTCount response: {}", e)))?;

        u64::try_from(count).map_err(|_| ContractError::Rpc("supply count out of range".to_string()))
    }

    async fn submit_mint(&self) -> ContractResult<TxHash> {
        let tx = self.request(makeAnEpicNFTCall {}.abi_encode());

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| {
                metrics::record_rpc_error("send_transaction");
                ContractError::Rpc(e.to_string())
            })?;

        Ok(*pending.tx_hash())
    }

    async fn await_mined(&self, tx_hash: TxHash) -> ContractResult<()> {
        let required = self.confirmation_blocks;

        let result = timeout(self.mint_timeout, async {
            let mut ticker = interval(RECEIPT_POLL_INTERVAL);

            loop {
                ticker.tick().await;

                let receipt = match self.provider.get_transaction_receipt(tx_hash).await {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::debug!(tx_hash = %tx_hash, "transaction pending");
                        continue;
                    }
                    Err(e) => return Err(ContractError::Rpc(e.to_string())),
                };

                if !receipt.status() {
                    return Err(ContractError::Reverted(format!(
                        "transaction {} reverted on-chain",
                        tx_hash
                    )));
                }

                if required == 0 {
                    return Ok(());
                }

                let current = self
                    .provider
                    .get_block_number()
                    .await
                    .map_err(|e| ContractError::Rpc(e.to_string()))?;
                let tx_block = receipt.block_number.unwrap_or(current);
                let confirmations = current.saturating_sub(tx_block) as u32;

                if confirmations >= required {
                    return Ok(());
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations,
                    required,
                    "waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(_) => Err(ContractError::Timeout(self.mint_timeout.as_secs())),
        }
    }

    fn subscribe(&self) -> ContractResult<MintEvents> {
        Ok(spawn_poll_task(
            self.provider.clone(),
            self.address,
            self.poll_interval,
            self.confirmation_blocks as u64,
        ))
    }
}

impl std::fmt::Debug for BoundContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundContract")
            .field("address", &self.address)
            .field("mint_timeout_secs", &self.mint_timeout.as_secs())
            .finish()
    }
}
