//! Wallet provider subsystem.
//!
//! # Data Flow
//! ```text
//! environment variable (signing key) + config (RPC URL)
//!     → injected.rs (key loading, account authorization, signer binding)
//!     → provider.rs (the WalletProvider boundary the session sees)
//! ```
//!
//! # Security Constraints
//! - Signing keys ONLY from environment variables
//! - Never log keys or sensitive material
//! - All RPC calls have configurable timeouts

pub mod injected;
pub mod provider;

pub use injected::InjectedWallet;
pub use provider::{detect, WalletError, WalletProvider};
