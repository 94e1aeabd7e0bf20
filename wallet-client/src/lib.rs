//! Wallet Client Library
//!
//! Chain-facing layer of the smart-account wallet: per-chain profiles
//! and policy, on-chain reads over JSON-RPC, transport boundaries for
//! account-abstraction and direct submission, and the assembler that
//! turns one user intent into an authorized on-chain operation.
//!
//! The library holds no keys and no mutable chain state; every call
//! constructs fresh request objects and re-reads whatever on-chain state
//! it depends on. Submission errors are surfaced verbatim; retrying
//! after `StaleNonce` is a caller decision.

pub mod authenticator;
pub mod batch_rpc;
pub mod calls;
pub mod config;
pub mod error;
pub mod evm_client;
pub mod policy;
pub(crate) mod rpc;
pub mod signer;
pub mod submitter;
pub mod transport;

// Re-export commonly used types
pub use authenticator::{authenticate, AuthenticationStrategy};
pub use batch_rpc::BundlerRpc;
pub use config::{ChainProfile, SponsorshipMode, WalletConfig};
pub use error::WalletError;
pub use evm_client::EvmClient;
pub use policy::{
    resolve_payment_mode, FeeTokenApproval, PaymentDecision, PaymentMode, PaymentOptions,
    BOOTSTRAP_APPROVAL_AMOUNT, MIN_FEE_TOKEN_ALLOWANCE,
};
pub use signer::{
    adjust_recovery_byte, EoaOperationSigner, LocalOwnerSigner, PasskeyOperationSigner,
};
pub use submitter::{
    MultiOwnerAccount, RecoveryOwnerSet, SmartAccountDescriptor, SubmissionPhase,
    TransactionRequest, TransferTarget, WalletService, PASSKEY_CALL_GAS_PER_CALL,
    PASSKEY_PRE_VERIFICATION_GAS, PASSKEY_VERIFICATION_GAS,
};
pub use transport::{
    AccountAbstractionTransport, AuthenticatorFailure, BatchRequest, Call, ExecutionTransport,
    GasOverrides, OwnerSigner, PaymentDescriptor, PlatformAuthenticator, SignatureScheme,
    TransactionOutcome, UserOperationSigner,
};
