//! Chain identity types and the network guard.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Chain ID type for strong typing.
///
/// Displayed in the `0x…` hexadecimal form the wallet boundary uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16).map(Self),
            None => s.parse().map(Self),
        }
    }
}

/// Errors raised by network validation.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The active chain is not the required target network.
    #[error("wrong network: expected chain {expected}, connected to {actual}")]
    Mismatch { expected: ChainId, actual: ChainId },
}

/// Validates the active chain identifier against the single required target.
#[derive(Debug, Clone, Copy)]
pub struct NetworkGuard {
    expected: ChainId,
}

impl NetworkGuard {
    /// Create a guard for one fixed target network.
    pub fn new(expected: ChainId) -> Self {
        Self { expected }
    }

    /// The required chain id.
    pub fn expected(&self) -> ChainId {
        self.expected
    }

    /// Check the observed chain id. On mismatch the caller must abort the
    /// in-progress flow before any account or contract binding happens.
    pub fn check(&self, actual: ChainId) -> Result<(), NetworkError> {
        if actual != self.expected {
            return Err(NetworkError::Mismatch {
                expected: self.expected,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_renders_as_hex() {
        assert_eq!(ChainId(4).to_string(), "0x4");
        assert_eq!(ChainId(31337).to_string(), "0x7a69");
    }

    #[test]
    fn chain_id_parses_hex_and_decimal() {
        assert_eq!("0x4".parse::<ChainId>().unwrap(), ChainId(4));
        assert_eq!("0x7a69".parse::<ChainId>().unwrap(), ChainId(31337));
        assert_eq!("1".parse::<ChainId>().unwrap(), ChainId(1));
        assert!("0xzz".parse::<ChainId>().is_err());
    }

    #[test]
    fn guard_accepts_only_the_target() {
        let guard = NetworkGuard::new(ChainId(4));
        assert!(guard.check(ChainId(4)).is_ok());

        let err = guard.check(ChainId(1)).unwrap_err();
        let NetworkError::Mismatch { expected, actual } = err;
        assert_eq!(expected, ChainId(4));
        assert_eq!(actual, ChainId(1));
    }

    #[test]
    fn mismatch_message_names_both_chains() {
        let guard = NetworkGuard::new(ChainId(4));
        let err = guard.check(ChainId(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong network: expected chain 0x4, connected to 0x1"
        );
    }
}
