//! Transport Boundary Traits
//!
//! The wallet core never talks to an account-abstraction SDK directly.
//! These traits describe exactly the fields the core needs from its
//! collaborators — a batch of calls with optional gas overrides and an
//! optional payment descriptor, an ordinary-transaction sender for the
//! direct path, the platform authenticator, and an owner key. Adapters
//! for the real infrastructure implement them in one place each.

use async_trait::async_trait;
use passkey_signer::WebAuthnAssertion;
use safe_account::Address;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// One call in a batched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub to: Address,
    pub value: u128,
    pub data: Vec<u8>,
}

/// Explicit gas limits, used when the signing step cannot be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasOverrides {
    pub call_gas_limit: u64,
    pub verification_gas_limit: u64,
    pub pre_verification_gas: u64,
}

/// How the network fee for a batch is paid.
///
/// Absence of a descriptor means payment in the native asset with no fee
/// abstraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDescriptor {
    /// Fees covered by operator policy.
    Sponsored,
    /// Fees drawn from the user's ERC-20 fee-token allowance.
    FeeToken { token: Address },
}

/// One batched operation handed to the account-abstraction transport.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub chain_id: u64,
    /// The smart account the batch executes from
    pub account: Address,
    /// Ordered calls, executed atomically
    pub calls: Vec<Call>,
    /// Fixed gas limits; `None` lets the transport simulate
    pub gas: Option<GasOverrides>,
    /// Payment mode; `None` means native-asset payment
    pub payment: Option<PaymentDescriptor>,
}

/// Terminal result of a submission; confirmation polling is the caller's
/// concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub transaction_hash: String,
}

/// Signs the transport's operation digest on behalf of the account owner.
///
/// The transport computes its own digest for the batch; the signer turns
/// it into verifier-ready signature bytes. For passkey owners that means
/// a platform-authenticator round trip, which cannot be simulated.
#[async_trait]
pub trait UserOperationSigner: Send + Sync {
    async fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, WalletError>;

    /// Whether a dry-run of the signing step is possible. Gas estimation
    /// by simulation is only available when it is.
    fn supports_simulation(&self) -> bool;
}

/// Submits batched operations through account abstraction.
#[async_trait]
pub trait AccountAbstractionTransport: Send + Sync {
    async fn submit(
        &self,
        request: &BatchRequest,
        signer: &dyn UserOperationSigner,
    ) -> Result<TransactionOutcome, WalletError>;
}

/// Sends a single ordinary transaction from an externally-owned wallet.
///
/// Used only by the legacy direct-execution path, where the calling key
/// pays its own gas and invokes the account contract directly.
#[async_trait]
pub trait ExecutionTransport: Send + Sync {
    async fn send_call(&self, chain_id: u64, call: &Call)
        -> Result<TransactionOutcome, WalletError>;
}

/// Typed outcome of one platform-authenticator attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorFailure {
    /// The user dismissed the prompt.
    Cancelled,
    /// The requested credential is not available on this authenticator.
    CredentialNotFound,
    /// Any other authenticator failure.
    Failed(String),
}

/// The platform authenticator presenting biometric/passkey prompts.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Requests an assertion over the challenge. `credential_id` pins a
    /// specific credential; `None` requests a discoverable one.
    async fn sign(
        &self,
        challenge: &[u8; 32],
        credential_id: Option<&str>,
    ) -> Result<WebAuthnAssertion, AuthenticatorFailure>;
}

/// Recovery-byte convention a 65-byte owner signature follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Plain ECDSA over the raw transaction hash (v in {27, 28})
    Ecdsa,
    /// Prefixed-message signing (contract expects v in {31, 32})
    EthSign,
}

/// An externally-owned owner key that can sign 32-byte hashes.
#[async_trait]
pub trait OwnerSigner: Send + Sync {
    fn address(&self) -> Address;
    fn scheme(&self) -> SignatureScheme;

    /// Returns a 65-byte r ‖ s ‖ v signature over the hash.
    async fn sign_hash(&self, hash: &[u8; 32]) -> Result<[u8; 65], WalletError>;
}
