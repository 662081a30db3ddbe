//! The minting session state machine.
//!
//! # Responsibilities
//! - Own the session value and the contract handle
//! - Sequence wallet discovery, network validation, and contract binding
//! - Gate mint submission on the advisory supply check
//! - Consume mint-completion events and derive the asset link
//!
//! # Ordering Constraints
//! Within one connect flow, network validation strictly precedes contract
//! binding, which strictly precedes the first supply query and the event
//! subscription. The mint flow is serialized per session: a second mint
//! intent while one is in flight is rejected, never queued.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::MintConfig;
use crate::contract::{ContractError, MintContract, MintEvent, MintEvents};
use crate::network::{NetworkError, NetworkGuard};
use crate::observability::metrics;
use crate::session::state::{Session, SessionPhase, TOTAL_MINT_COUNT};
use crate::wallet::{WalletError, WalletProvider};

/// Errors surfaced to the presentation layer.
///
/// All provider and contract failures are converted at the boundary where
/// they occur; nothing propagates uncaught past the controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No wallet provider is available; the user must install or configure
    /// one before anything else can happen.
    #[error("no wallet provider found; install one to continue")]
    ProviderAbsent,

    /// The active chain is not the required target network.
    #[error(transparent)]
    NetworkMismatch(#[from] NetworkError),

    /// The user declined the authorization prompt.
    #[error("authorization request rejected")]
    UserRejected,

    /// The advisory supply gate tripped; no transaction was sent.
    #[error("all {total} tokens have been minted")]
    SoldOut { total: u64 },

    /// The intent requires a connected session.
    #[error("not connected")]
    NotConnected,

    /// A mint transaction is already in flight.
    #[error("a mint is already in progress")]
    MintInProgress,

    /// The wallet provider failed outside the cases above.
    #[error("wallet provider error: {0}")]
    Provider(WalletError),

    /// The contract boundary failed outside the mint flow.
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl From<WalletError> for SessionError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::UserRejected => SessionError::UserRejected,
            WalletError::Bind(inner) => SessionError::Contract(inner),
            other => SessionError::Provider(other),
        }
    }
}

impl SessionError {
    /// Whether the presentation layer should show a blocking notice.
    /// Everything else degrades to diagnostic-only reporting.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::ProviderAbsent | Self::NetworkMismatch(_) | Self::SoldOut { .. }
        )
    }
}

/// Observable result of one mint attempt.
///
/// A failed attempt still returns the session to idle; the failure is
/// reported here and in the logs, but no session field records it.
#[derive(Debug)]
pub enum MintOutcome {
    /// Transaction mined. The asset link arrives separately, via the
    /// mint-completion event.
    Mined { tx_hash: TxHash },
    /// Transaction reverted, was dropped, or timed out.
    Failed { reason: ContractError },
}

/// The state machine driving a minting session.
pub struct MintSessionController {
    config: MintConfig,
    guard: NetworkGuard,
    wallet: Option<Arc<dyn WalletProvider>>,
    session: Session,
    contract: Option<Box<dyn MintContract>>,
    events: Option<MintEvents>,
}

impl MintSessionController {
    /// Create a controller over an optional wallet provider.
    ///
    /// `wallet` is `None` when discovery found nothing; connect intents then
    /// surface [`SessionError::ProviderAbsent`].
    pub fn new(config: MintConfig, wallet: Option<Arc<dyn WalletProvider>>) -> Self {
        let guard = NetworkGuard::new(config.network.chain_id.into());
        Self {
            config,
            guard,
            wallet,
            session: Session::default(),
            contract: None,
            events: None,
        }
    }

    /// Immutable snapshot of the session for rendering.
    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    /// Silent reconnect attempt, run once at startup.
    ///
    /// Queries the provider passively; never prompts. With no provider or no
    /// previously authorized account the session simply stays disconnected.
    pub async fn bootstrap(&mut self) -> Result<(), SessionError> {
        let Some(wallet) = self.wallet.clone() else {
            tracing::warn!("no wallet provider found");
            return Ok(());
        };

        let chain = wallet.chain_id().await?;
        self.session.chain_id = Some(chain);
        tracing::info!(chain_id = %chain, "connected to chain");
        self.guard.check(chain)?;

        let accounts = wallet.accounts().await?;
        let Some(account) = accounts.first().copied() else {
            tracing::info!("no authorized account found");
            return Ok(());
        };
        tracing::info!(account = %account, "found an authorized account");

        self.install_handle(wallet.as_ref(), account).await
    }

    /// Connect intent: request authorization, validate the network, and bind
    /// a contract handle.
    ///
    /// On any failure no partial handle is retained and the session lands in
    /// `Disconnected`.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.session.phase == SessionPhase::Minting {
            return Err(SessionError::MintInProgress);
        }
        let Some(wallet) = self.wallet.clone() else {
            return Err(SessionError::ProviderAbsent);
        };

        self.session.phase = SessionPhase::Connecting;
        let result = self.connect_flow(wallet.as_ref()).await;
        if result.is_err() {
            self.teardown_handle();
            self.session.account = None;
            self.session.minted_count = None;
            self.session.asset_link = None;
            self.session.phase = SessionPhase::Disconnected;
        }
        result
    }

    async fn connect_flow(&mut self, wallet: &dyn WalletProvider) -> Result<(), SessionError> {
        let chain = wallet.chain_id().await?;
        self.session.chain_id = Some(chain);
        self.guard.check(chain)?;

        let accounts = wallet.request_accounts().await?;
        let account = accounts.first().copied().ok_or(SessionError::UserRejected)?;
        tracing::info!(account = %account, "account connected");

        self.install_handle(wallet, account).await
    }

    /// Bind a fresh contract handle for `account` and run the once-per-handle
    /// work: supply query, then event subscription.
    async fn install_handle(
        &mut self,
        wallet: &dyn WalletProvider,
        account: Address,
    ) -> Result<(), SessionError> {
        // Retire any previous subscription before a new one is installed, so
        // stale-account listeners can never fire again.
        self.teardown_handle();

        if self.session.account != Some(account) {
            // the asset link belongs to the previous account
            self.session.asset_link = None;
        }

        let contract = wallet.bind_contract(&self.config.contract)?;
        let minted = contract.minted_count().await?;
        let events = contract.subscribe()?;

        self.session.account = Some(account);
        self.session.minted_count = Some(minted);
        self.session.phase = SessionPhase::Idle;
        self.contract = Some(contract);
        self.events = Some(events);

        metrics::record_wallet_connect();
        tracing::info!(
            account = %account,
            minted,
            total = TOTAL_MINT_COUNT,
            "contract handle bound"
        );
        Ok(())
    }

    fn teardown_handle(&mut self) {
        // dropping the subscription aborts its poll task
        self.events = None;
        self.contract = None;
    }

    /// Mint intent.
    ///
    /// The local supply gate is advisory: it can be stale relative to
    /// concurrent mints, and the contract remains the source of truth for
    /// capacity. A stale pass simply surfaces as a reverted transaction.
    pub async fn mint(&mut self) -> Result<MintOutcome, SessionError> {
        match self.session.phase {
            SessionPhase::Minting => return Err(SessionError::MintInProgress),
            SessionPhase::Idle => {}
            SessionPhase::Disconnected | SessionPhase::Connecting => {
                return Err(SessionError::NotConnected)
            }
        }
        let Some(contract) = self.contract.as_deref() else {
            return Err(SessionError::NotConnected);
        };

        if self.session.minted_count.unwrap_or(0) >= TOTAL_MINT_COUNT {
            return Err(SessionError::SoldOut {
                total: TOTAL_MINT_COUNT,
            });
        }

        self.session.phase = SessionPhase::Minting;
        self.session.is_loading = true;

        let attempt_id = Uuid::new_v4();
        tracing::info!(%attempt_id, "minting; wallet will prompt to pay gas");

        let outcome: Result<TxHash, ContractError> = async {
            let tx_hash = contract.submit_mint().await?;
            metrics::record_mint_submitted();
            tracing::info!(
                %attempt_id,
                tx_hash = %tx_hash,
                "mint transaction broadcast, waiting for inclusion"
            );
            contract.await_mined(tx_hash).await?;
            Ok(tx_hash)
        }
        .await;

        // control returns to an interactive idle state regardless of outcome
        self.session.is_loading = false;
        self.session.phase = SessionPhase::Idle;

        match outcome {
            Ok(tx_hash) => {
                metrics::record_mint_mined();
                match self.config.links.transaction(tx_hash) {
                    Ok(url) => {
                        tracing::info!(%attempt_id, tx_hash = %tx_hash, url = %url, "mint transaction mined")
                    }
                    Err(_) => {
                        tracing::info!(%attempt_id, tx_hash = %tx_hash, "mint transaction mined")
                    }
                }
                Ok(MintOutcome::Mined { tx_hash })
            }
            Err(reason) => {
                metrics::record_mint_failed();
                tracing::warn!(%attempt_id, error = %reason, "mint failed; session back to idle");
                Ok(MintOutcome::Failed { reason })
            }
        }
    }

    /// Wait for the next mint-completion event on the live subscription.
    ///
    /// Pends forever while no subscription is installed, so this can sit in a
    /// select loop unconditionally.
    pub async fn next_event(&mut self) -> Option<MintEvent> {
        let event = match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => return std::future::pending::<Option<MintEvent>>().await,
        };
        if event.is_none() {
            tracing::warn!("mint event subscription ended");
            self.events = None;
        }
        event
    }

    /// Apply one mint-completion event.
    ///
    /// Re-queries the supply count (the chain is authoritative; the count is
    /// never incremented locally) and, when the minter is the connected
    /// account, derives the shareable asset link.
    pub async fn handle_mint_event(&mut self, event: MintEvent) {
        metrics::record_mint_event();
        tracing::info!(minter = %event.minter, token_id = event.token_id, "mint event received");

        if let Some(contract) = self.contract.as_deref() {
            match contract.minted_count().await {
                Ok(count) => self.session.minted_count = Some(count),
                Err(e) => tracing::warn!(error = %e, "failed to refresh minted count"),
            }
        }

        // Address equality is byte-wise; hex casing is a rendering artifact,
        // so the minter match is case-insensitive by construction.
        if self.session.account != Some(event.minter) {
            return;
        }
        let Some(contract) = self.contract.as_deref() else {
            return;
        };

        match self.config.links.asset(contract.address(), event.token_id) {
            Ok(url) => {
                tracing::info!(url = %url, "minted asset link ready");
                self.session.asset_link = Some(url);
            }
            Err(e) => tracing::warn!(error = %e, "could not build asset link"),
        }
    }

    /// ViewCollection intent: the external collection listing.
    pub fn collection_url(&self) -> Result<Url, url::ParseError> {
        self.config.links.collection()
    }

    /// ViewMintedAsset intent: the derived asset link, once one exists.
    pub fn minted_asset_url(&self) -> Option<Url> {
        self.session.asset_link.clone()
    }
}

impl std::fmt::Debug for MintSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintSessionController")
            .field("phase", &self.session.phase)
            .field("account", &self.session.account)
            .field("has_handle", &self.contract.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> MintSessionController {
        MintSessionController::new(MintConfig::default(), None)
    }

    #[tokio::test]
    async fn connect_without_provider_is_a_blocking_error() {
        let mut c = controller();
        let err = c.connect().await.unwrap_err();
        assert!(matches!(err, SessionError::ProviderAbsent));
        assert!(err.is_blocking());
        assert_eq!(c.snapshot().phase, SessionPhase::Disconnected);
    }

    #[tokio::test]
    async fn bootstrap_without_provider_stays_quietly_disconnected() {
        let mut c = controller();
        c.bootstrap().await.unwrap();
        assert_eq!(c.snapshot().phase, SessionPhase::Disconnected);
    }

    #[tokio::test]
    async fn mint_requires_a_connection() {
        let mut c = controller();
        let err = c.mint().await.unwrap_err();
        assert!(matches!(err, SessionError::NotConnected));
    }

    #[tokio::test]
    async fn second_mint_is_rejected_while_one_is_in_flight() {
        let mut c = controller();
        c.session.phase = SessionPhase::Minting;
        let err = c.mint().await.unwrap_err();
        assert!(matches!(err, SessionError::MintInProgress));

        let err = c.connect().await.unwrap_err();
        assert!(matches!(err, SessionError::MintInProgress));
    }

    #[test]
    fn rejection_and_mint_failure_are_diagnostic_only() {
        assert!(!SessionError::UserRejected.is_blocking());
        assert!(!SessionError::Contract(ContractError::Dropped).is_blocking());
        assert!(SessionError::SoldOut { total: 50 }.is_blocking());
    }

    #[test]
    fn wallet_errors_map_into_the_session_taxonomy() {
        let err: SessionError = WalletError::UserRejected.into();
        assert!(matches!(err, SessionError::UserRejected));

        let err: SessionError = WalletError::Rpc("boom".into()).into();
        assert!(matches!(err, SessionError::Provider(_)));
    }
}
