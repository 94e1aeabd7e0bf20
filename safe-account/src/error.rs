//! Error types for account derivation.

use thiserror::Error;

/// Errors produced while deriving account addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// The signature threshold is outside `[1, owner_count]`.
    #[error("invalid threshold {threshold} for {owners} owner(s)")]
    InvalidThreshold { threshold: u64, owners: usize },

    /// The owner set is empty or contains a duplicate address.
    #[error("invalid owner set: {0}")]
    InvalidOwnerSet(&'static str),
}
