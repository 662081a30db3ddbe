//! Target-network validation subsystem.
//!
//! Every mutating flow must pass the guard before any account or contract
//! binding takes place; an unvalidated network could bind a handle to the
//! wrong deployment.

pub mod guard;

pub use guard::{ChainId, NetworkError, NetworkGuard};
