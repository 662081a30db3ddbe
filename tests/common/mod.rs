//! Shared in-memory chain fixtures for the session tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, TxHash};
use async_trait::async_trait;
use tokio::sync::mpsc;

use mint_client::config::ContractConfig;
use mint_client::contract::{
    ContractError, ContractResult, MintContract, MintEvent, MintEvents,
};
use mint_client::network::ChainId;
use mint_client::wallet::{WalletError, WalletProvider};

pub const CONTRACT: Address = address!("a40e689b8f5b11ce953694c51401dd49f44d5091");
pub const ACCOUNT_A: Address = address!("00000000000000000000000000000000000000aa");
pub const ACCOUNT_B: Address = address!("00000000000000000000000000000000000000bb");

/// Scriptable chain state shared between a mock wallet and its contracts.
#[derive(Default)]
pub struct MockChain {
    pub chain_id: AtomicU64,
    pub minted: AtomicU64,
    /// Transactions broadcast so far.
    pub submitted: AtomicU64,
    /// Contract handles bound so far.
    pub binds: AtomicU64,
    /// Next mint attempt reverts at inclusion time.
    pub revert_mint: AtomicBool,
    subscribers: Mutex<Vec<mpsc::Sender<MintEvent>>>,
}

impl MockChain {
    pub fn new(chain_id: u64, minted: u64) -> Arc<Self> {
        let chain = Self::default();
        chain.chain_id.store(chain_id, Ordering::SeqCst);
        chain.minted.store(minted, Ordering::SeqCst);
        Arc::new(chain)
    }

    /// Deliver a mint event to every live subscription.
    pub fn emit(&self, minter: Address, token_id: u64) {
        let subscribers = self.subscribers.lock().unwrap();
        for tx in subscribers.iter() {
            let _ = tx.try_send(MintEvent { minter, token_id });
        }
    }

    /// Subscriptions whose receiving side is still alive.
    pub fn live_subscriptions(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

/// Wallet provider over a [`MockChain`].
pub struct MockWallet {
    chain: Arc<MockChain>,
    accounts: Mutex<Vec<Address>>,
    /// Whether the passive query already sees the accounts.
    authorized: AtomicBool,
    /// The authorization prompt is declined.
    pub reject_request: AtomicBool,
}

impl MockWallet {
    pub fn new(chain: Arc<MockChain>, accounts: Vec<Address>) -> Self {
        Self {
            chain,
            accounts: Mutex::new(accounts),
            authorized: AtomicBool::new(false),
            reject_request: AtomicBool::new(false),
        }
    }

    pub fn pre_authorized(chain: Arc<MockChain>, accounts: Vec<Address>) -> Self {
        let wallet = Self::new(chain, accounts);
        wallet.authorized.store(true, Ordering::SeqCst);
        wallet
    }

    /// Swap the accounts the wallet authorizes, as if the user switched.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        Ok(ChainId::from(self.chain.chain_id.load(Ordering::SeqCst)))
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(self.accounts.lock().unwrap().clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.reject_request.load(Ordering::SeqCst) {
            return Err(WalletError::UserRejected);
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(self.accounts.lock().unwrap().clone())
    }

    fn bind_contract(&self, _config: &ContractConfig) -> Result<Box<dyn MintContract>, WalletError> {
        if !self.authorized.load(Ordering::SeqCst) {
            return Err(WalletError::NotAuthorized);
        }
        self.chain.binds.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockContract {
            chain: self.chain.clone(),
        }))
    }
}

/// Contract handle over a [`MockChain`].
pub struct MockContract {
    chain: Arc<MockChain>,
}

#[async_trait]
impl MintContract for MockContract {
    fn address(&self) -> Address {
        CONTRACT
    }

    async fn minted_count(&self) -> ContractResult<u64> {
        Ok(self.chain.minted.load(Ordering::SeqCst))
    }

    async fn submit_mint(&self) -> ContractResult<TxHash> {
        self.chain.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(TxHash::with_last_byte(0x42))
    }

    async fn await_mined(&self, tx_hash: TxHash) -> ContractResult<()> {
        if self.chain.revert_mint.load(Ordering::SeqCst) {
            return Err(ContractError::Reverted(format!(
                "transaction {} reverted on-chain",
                tx_hash
            )));
        }
        Ok(())
    }

    fn subscribe(&self) -> ContractResult<MintEvents> {
        let (tx, rx) = mpsc::channel(8);
        self.chain.subscribers.lock().unwrap().push(tx);
        Ok(MintEvents::from_receiver(rx))
    }
}
