//! Batch-Call Transport Adapter
//!
//! Implements the account-abstraction transport over a wallet JSON-RPC
//! service speaking the prepare/send call-batch flow: the service turns
//! the batch into a user operation and returns the digest to sign, the
//! wallet signs it (passkey or owner key), and the signed operation is
//! submitted. This is the single module that knows the service's wire
//! shape; the rest of the wallet sees only the transport trait.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::config::ChainProfile;
use crate::error::WalletError;
use crate::rpc::RpcCaller;
use crate::transport::{
    AccountAbstractionTransport, BatchRequest, PaymentDescriptor, TransactionOutcome,
    UserOperationSigner,
};

/// Account-abstraction transport over a bundler's wallet RPC.
pub struct BundlerRpc {
    rpc: RpcCaller,
}

#[derive(Debug, Deserialize)]
struct PreparedCalls {
    /// Opaque service-side context echoed back on submission
    context: serde_json::Value,
    /// 32-byte operation digest the owner must sign
    digest: String,
}

impl BundlerRpc {
    /// Creates a transport for a bundler endpoint.
    pub fn new(bundler_url: &str) -> Result<Self, WalletError> {
        Ok(Self {
            rpc: RpcCaller::new(bundler_url)?,
        })
    }

    /// Creates a transport for a chain profile's bundler.
    pub fn for_profile(profile: &ChainProfile) -> Result<Self, WalletError> {
        Self::new(&profile.bundler_url)
    }

    fn prepare_params(request: &BatchRequest) -> serde_json::Value {
        let calls: Vec<serde_json::Value> = request
            .calls
            .iter()
            .map(|call| {
                json!({
                    "to": call.to.to_string(),
                    "value": format!("0x{:x}", call.value),
                    "data": format!("0x{}", hex::encode(&call.data)),
                })
            })
            .collect();

        let mut capabilities = serde_json::Map::new();
        match &request.payment {
            Some(PaymentDescriptor::Sponsored) => {
                capabilities.insert("paymasterService".to_string(), json!({"sponsored": true}));
            }
            Some(PaymentDescriptor::FeeToken { token }) => {
                capabilities.insert(
                    "paymasterService".to_string(),
                    json!({"feeToken": token.to_string()}),
                );
            }
            None => {}
        }
        if let Some(gas) = &request.gas {
            capabilities.insert(
                "gasLimits".to_string(),
                json!({
                    "call": format!("0x{:x}", gas.call_gas_limit),
                    "verification": format!("0x{:x}", gas.verification_gas_limit),
                    "preVerification": format!("0x{:x}", gas.pre_verification_gas),
                }),
            );
        }

        json!({
            "version": "1.0",
            "chainId": format!("0x{:x}", request.chain_id),
            "from": request.account.to_string(),
            "calls": calls,
            "capabilities": capabilities,
        })
    }
}

#[async_trait]
impl AccountAbstractionTransport for BundlerRpc {
    async fn submit(
        &self,
        request: &BatchRequest,
        signer: &dyn UserOperationSigner,
    ) -> Result<TransactionOutcome, WalletError> {
        let prepared: PreparedCalls = self
            .rpc
            .call("wallet_prepareCalls", vec![Self::prepare_params(request)])
            .await
            .map_err(map_submission_error)?;

        let digest_bytes = hex::decode(prepared.digest.strip_prefix("0x").unwrap_or(&prepared.digest))
            .map_err(|e| WalletError::Decode(format!("invalid digest hex: {e}")))?;
        let digest = <[u8; 32]>::try_from(digest_bytes.as_slice())
            .map_err(|_| WalletError::Decode("digest is not 32 bytes".to_string()))?;

        // SignerRejected from the authenticator propagates untouched here.
        let signature = signer.sign_digest(&digest).await?;

        let identifier: String = self
            .rpc
            .call(
                "wallet_sendPreparedCalls",
                vec![json!({
                    "context": prepared.context,
                    "signature": format!("0x{}", hex::encode(&signature)),
                })],
            )
            .await
            .map_err(map_submission_error)?;

        info!(chain_id = request.chain_id, %identifier, "batch submitted");
        Ok(TransactionOutcome {
            transaction_hash: identifier,
        })
    }
}

/// Maps a bundler-side RPC rejection into the submission taxonomy.
///
/// A stale replay counter is surfaced distinctly so callers can re-read
/// state and resubmit; everything else passes through verbatim. No
/// automatic retry happens at this layer.
pub(crate) fn map_submission_error(error: WalletError) -> WalletError {
    match error {
        WalletError::Rpc { code, message } => {
            if message.to_lowercase().contains("nonce") {
                WalletError::StaleNonce
            } else {
                WalletError::SubmissionFailed(format!("{message} (code {code})"))
            }
        }
        WalletError::SubmissionFailed(message)
            if message.to_lowercase().contains("nonce") =>
        {
            WalletError::StaleNonce
        }
        other => other,
    }
}
