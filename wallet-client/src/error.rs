//! Error taxonomy for wallet operations.

use passkey_signer::PasskeyError;
use safe_account::{AccountError, Address};
use thiserror::Error;

/// Errors surfaced by the chain-facing wallet layer.
///
/// Parsing and derivation failures are deterministic and terminal.
/// Network failures are surfaced verbatim and never retried here;
/// `StaleNonce` in particular is retryable by the caller after re-reading
/// chain state.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The chain id is not present in the configured profile table.
    #[error("chain {0} is not supported")]
    UnsupportedChain(u64),

    /// The user cancelled the platform authenticator prompt. Distinct
    /// from any network failure.
    #[error("platform authentication was cancelled by the user")]
    SignerRejected,

    /// No usable credential or a hard authenticator failure.
    #[error("platform authentication failed: {0}")]
    Authentication(String),

    /// The transport or bundler rejected the submission.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// The on-chain replay counter moved between read and submission.
    #[error("on-chain nonce moved between read and submission")]
    StaleNonce,

    /// The signing key is not an owner of the target account.
    #[error("{0} is not an owner of the account")]
    NotAnOwner(Address),

    /// Fee-token payment requires an allowance that is not in place.
    #[error("fee token allowance is below the required minimum")]
    NoAllowance,

    /// HTTP-level failure talking to a node or bundler.
    #[error("transport error: {0}")]
    Transport(String),

    /// JSON-RPC error response from a node or bundler.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// A chain response could not be decoded.
    #[error("could not decode chain response: {0}")]
    Decode(String),

    #[error(transparent)]
    Passkey(#[from] PasskeyError),

    #[error(transparent)]
    Account(#[from] AccountError),
}
