//! Contract gateway subsystem.
//!
//! # Data Flow
//! ```text
//! wallet adapter (signer-capable provider)
//!     → gateway.rs (bind interface → typed read/write/confirm)
//!     → events.rs (scoped log-poll subscription → MintEvent channel)
//!     → session controller
//! ```

pub mod events;
pub mod gateway;
pub mod types;

pub use events::MintEvents;
pub use gateway::{BoundContract, ContractGateway, MintContract};
pub use types::{ContractError, ContractResult, MintEvent};
