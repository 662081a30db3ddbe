//! Session state.
//!
//! The session is an explicit value owned by the controller and mutated only
//! through its transitions; the presentation layer receives immutable
//! snapshots.

use alloy::primitives::Address;
use url::Url;

use crate::network::ChainId;

/// Total number of tokens that will ever exist.
pub const TOTAL_MINT_COUNT: u64 = 50;

/// Where the session currently is in its lifecycle.
///
/// ```text
/// Disconnected → Connecting → Idle → Minting → Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No authorized account. Initial state; also the landing state for any
    /// failed connect.
    #[default]
    Disconnected,
    /// A connect flow is in progress.
    Connecting,
    /// Connected with a bound contract handle, ready for intents.
    Idle,
    /// A mint transaction is in flight.
    Minting,
}

/// Immutable snapshot of the minting session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Lifecycle phase.
    pub phase: SessionPhase,

    /// The connected account, if any.
    pub account: Option<Address>,

    /// Chain id last observed from the wallet provider.
    pub chain_id: Option<ChainId>,

    /// True while a mint transaction is in flight.
    pub is_loading: bool,

    /// Supply count as last read from the contract. `None` until the first
    /// query after a handle is bound.
    pub minted_count: Option<u64>,

    /// Fixed total supply.
    pub total_supply: u64,

    /// Shareable link to the asset most recently minted by the connected
    /// account. Only ever set for that account.
    pub asset_link: Option<Url>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Disconnected,
            account: None,
            chain_id: None,
            is_loading: false,
            minted_count: None,
            total_supply: TOTAL_MINT_COUNT,
            asset_link: None,
        }
    }
}

impl Session {
    /// Whether an account is connected with a bound handle.
    pub fn is_connected(&self) -> bool {
        matches!(self.phase, SessionPhase::Idle | SessionPhase::Minting)
    }

    /// Whether the advisory supply gate considers the collection exhausted.
    pub fn sold_out(&self) -> bool {
        self.minted_count.unwrap_or(0) >= self.total_supply
    }

    /// The `"<minted>/<total> minted"` banner, once the count is known.
    pub fn supply_banner(&self) -> Option<String> {
        self.minted_count
            .map(|count| format!("{}/{} minted", count, self.total_supply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected_and_empty() {
        let session = Session::default();
        assert_eq!(session.phase, SessionPhase::Disconnected);
        assert!(!session.is_connected());
        assert!(session.account.is_none());
        assert!(session.asset_link.is_none());
        assert_eq!(session.total_supply, 50);
    }

    #[test]
    fn banner_appears_once_count_is_known() {
        let mut session = Session::default();
        assert_eq!(session.supply_banner(), None);

        session.minted_count = Some(12);
        assert_eq!(session.supply_banner().unwrap(), "12/50 minted");
    }

    #[test]
    fn sold_out_at_total_supply() {
        let mut session = Session::default();
        assert!(!session.sold_out());

        session.minted_count = Some(49);
        assert!(!session.sold_out());

        session.minted_count = Some(50);
        assert!(session.sold_out());
    }
}
