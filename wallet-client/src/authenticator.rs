//! Authentication Strategy Sequencing
//!
//! Passkey authentication is an ordered list of strategies tried in
//! sequence: the credential the wallet knows about first, then a
//! discoverable credential. Each attempt has a typed outcome; user
//! cancellation short-circuits the whole sequence and is surfaced as a
//! distinct failure, never conflated with a network error.

use passkey_signer::WebAuthnAssertion;
use tracing::debug;

use crate::error::WalletError;
use crate::transport::{AuthenticatorFailure, PlatformAuthenticator};

/// One way of locating a credential on the platform authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationStrategy {
    /// Request a specific credential by id.
    Credential(String),
    /// Let the authenticator discover a resident credential.
    Discoverable,
}

/// Runs the strategies in order until one produces an assertion.
///
/// * `Cancelled` stops the sequence immediately (`SignerRejected`).
/// * `CredentialNotFound` moves on to the next strategy.
/// * `Failed` is remembered and surfaced if nothing later succeeds.
pub async fn authenticate(
    authenticator: &dyn PlatformAuthenticator,
    strategies: &[AuthenticationStrategy],
    challenge: &[u8; 32],
) -> Result<WebAuthnAssertion, WalletError> {
    let mut last_failure: Option<String> = None;

    for strategy in strategies {
        let credential_id = match strategy {
            AuthenticationStrategy::Credential(id) => Some(id.as_str()),
            AuthenticationStrategy::Discoverable => None,
        };
        match authenticator.sign(challenge, credential_id).await {
            Ok(assertion) => return Ok(assertion),
            Err(AuthenticatorFailure::Cancelled) => return Err(WalletError::SignerRejected),
            Err(AuthenticatorFailure::CredentialNotFound) => {
                debug!(?strategy, "credential not found, trying next strategy");
            }
            Err(AuthenticatorFailure::Failed(reason)) => {
                debug!(?strategy, %reason, "authenticator attempt failed");
                last_failure = Some(reason);
            }
        }
    }

    Err(WalletError::Authentication(
        last_failure.unwrap_or_else(|| "no usable credential".to_string()),
    ))
}
