//! Limited-supply mint client library.

pub mod config;
pub mod contract;
pub mod network;
pub mod observability;
pub mod session;
pub mod wallet;

pub use config::MintConfig;
pub use session::{MintOutcome, MintSessionController, Session, SessionError};
