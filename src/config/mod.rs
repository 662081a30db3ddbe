//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MintConfig (validated, immutable)
//!     → owned by the session controller
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults so the client runs without a config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ContractConfig;
pub use schema::LinkConfig;
pub use schema::MintConfig;
pub use schema::NetworkConfig;
pub use schema::WalletConfig;
