//! Minting session subsystem.
//!
//! # Data Flow
//! ```text
//! presentation layer
//!     → intents (connect, mint, view collection, view minted asset)
//!     → controller.rs (state machine)
//!     → wallet / network / contract subsystems
//!     → chain RPC → mint events → controller.rs
//!     → state.rs snapshot → presentation layer
//! ```
//!
//! # Design Decisions
//! - Session state is an explicit value mutated only through transitions
//! - The contract handle and its event subscription are exclusively owned
//!   by the controller; the presentation layer never touches them

pub mod controller;
pub mod state;

pub use controller::{MintOutcome, MintSessionController, SessionError};
pub use state::{Session, SessionPhase, TOTAL_MINT_COUNT};
