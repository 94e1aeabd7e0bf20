//! Transaction Assembler / Submitter
//!
//! Orchestrates one submission end to end: resolve the chain profile and
//! payment mode, check fee-token preconditions, build the ordered call
//! batch (prepending the bootstrap approval when instructed), pick the
//! gas-limit strategy for the signer type, and hand the batch to the
//! account-abstraction transport. The legacy direct-execution path
//! bypasses account abstraction entirely and drives the account contract
//! through an ordinary transaction instead.
//!
//! Every submission builds fresh request objects; nothing here caches
//! chain state between calls.

use std::time::Duration;
use tracing::info;

use safe_account::{
    derive_multi_owner_address, derive_single_owner_address, sorted_owner_set, transaction_hash,
    Address, OwnerMaterial, SafeTransaction,
};

use crate::batch_rpc::map_submission_error;
use crate::calls;
use crate::config::{ChainProfile, WalletConfig};
use crate::error::WalletError;
use crate::evm_client::EvmClient;
use crate::policy::{resolve_payment_mode, PaymentMode, PaymentOptions, MIN_FEE_TOKEN_ALLOWANCE};
use crate::signer::adjust_recovery_byte;
use crate::transport::{
    AccountAbstractionTransport, BatchRequest, Call, ExecutionTransport, GasOverrides,
    OwnerSigner, TransactionOutcome, UserOperationSigner,
};

// Fixed limits for signers whose signing step cannot be simulated. The
// call budget scales with the batch size: an extra approval call roughly
// doubles the execution gas.
pub const PASSKEY_CALL_GAS_PER_CALL: u64 = 250_000;
pub const PASSKEY_VERIFICATION_GAS: u64 = 600_000;
pub const PASSKEY_PRE_VERIFICATION_GAS: u64 = 100_000;

const DEPLOY_RECEIPT_ATTEMPTS: u32 = 30;
const DEPLOY_RECEIPT_INTERVAL: Duration = Duration::from_secs(2);

/// What a submission is asked to do: a plain call or a token transfer.
#[derive(Debug, Clone)]
pub enum TransferTarget {
    Call {
        to: Address,
        value: u128,
        data: Vec<u8>,
    },
    Token {
        token: Address,
        to: Address,
        amount: u128,
    },
}

/// One ephemeral submission request; built fresh per send, never mutated.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub chain_id: u64,
    pub target: TransferTarget,
}

/// Identity of a multi-owner account, from which its address derives.
#[derive(Debug, Clone)]
pub struct MultiOwnerAccount {
    pub owners: Vec<Address>,
    pub threshold: u64,
    pub salt_nonce: u128,
}

/// Point-in-time view of an account on one chain.
///
/// `is_deployed` is an observation, not a cached fact; re-query before
/// any operation that depends on it.
#[derive(Debug, Clone)]
pub struct SmartAccountDescriptor {
    pub chain_id: u64,
    pub address: Address,
    pub is_deployed: bool,
}

/// Owners and threshold of a deployed account, read fresh from chain.
#[derive(Debug, Clone)]
pub struct RecoveryOwnerSet {
    pub owners: Vec<Address>,
    pub threshold: u64,
}

/// Submission lifecycle, surfaced through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Built,
    Deploying,
    Deployed,
    Signing,
    Submitted,
    /// Reached only by callers polling the receipt; this layer stops at
    /// `Submitted`.
    Confirmed,
    Failed,
}

/// The chain-facing wallet service.
pub struct WalletService {
    config: WalletConfig,
}

impl WalletService {
    pub fn new(config: WalletConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    fn profile(&self, chain_id: u64) -> Result<&ChainProfile, WalletError> {
        self.config
            .profile(chain_id)
            .ok_or(WalletError::UnsupportedChain(chain_id))
    }

    // ========================================================================
    // ACCOUNT-ABSTRACTION PATH
    // ========================================================================

    /// Builds and submits one batched operation through account
    /// abstraction.
    ///
    /// # Arguments
    ///
    /// * `request` - Destination/value/data or token-transfer tuple
    /// * `account` - The smart account the batch executes from
    /// * `options` - Payment options (native override, bootstrap)
    /// * `signer` - Digest signer for the operation
    /// * `transport` - Account-abstraction transport adapter
    ///
    /// # Returns
    ///
    /// * `Ok(TransactionOutcome)` - Accepted; confirmation polling is the
    ///   caller's concern
    /// * `Err(WalletError)` - Unsupported chain, missing allowance,
    ///   cancelled authentication, or a transport rejection
    pub async fn send(
        &self,
        request: &TransactionRequest,
        account: Address,
        options: &PaymentOptions,
        signer: &dyn UserOperationSigner,
        transport: &dyn AccountAbstractionTransport,
    ) -> Result<TransactionOutcome, WalletError> {
        let profile = self.profile(request.chain_id)?;
        let decision = resolve_payment_mode(profile, options);

        // The fee-token path needs a pre-existing allowance to the
        // operator's collector; the bootstrap override is exactly the
        // escape hatch for accounts that do not have one yet.
        if let PaymentMode::FeeToken { token } = &decision.mode {
            let spender = profile.fee_collector.ok_or(WalletError::NoAllowance)?;
            let evm = EvmClient::new(&profile.rpc_url)?;
            let allowance = evm.allowance(*token, account, spender).await?;
            if allowance < MIN_FEE_TOKEN_ALLOWANCE {
                return Err(WalletError::NoAllowance);
            }
        }

        let mut batch_calls = Vec::new();
        if let Some(approval) = &decision.bootstrap_approval {
            batch_calls.push(calls::erc20_approve(
                approval.token,
                approval.spender,
                approval.amount,
            ));
        }
        batch_calls.push(target_call(&request.target));

        let gas = if signer.supports_simulation() {
            None
        } else {
            Some(fixed_gas_limits(batch_calls.len()))
        };

        let batch = BatchRequest {
            chain_id: request.chain_id,
            account,
            calls: batch_calls,
            gas,
            payment: decision.descriptor(),
        };
        info!(
            phase = ?SubmissionPhase::Built,
            chain_id = request.chain_id,
            calls = batch.calls.len(),
            sponsored = matches!(decision.mode, PaymentMode::Sponsored),
            "batch assembled"
        );

        let outcome = transport.submit(&batch, signer).await?;
        info!(
            phase = ?SubmissionPhase::Submitted,
            transaction_hash = %outcome.transaction_hash,
            "batch accepted"
        );
        Ok(outcome)
    }

    // ========================================================================
    // LEGACY DIRECT-EXECUTION PATH
    // ========================================================================

    /// Executes one transaction directly against a multi-owner account,
    /// deploying the account first when it has no code yet.
    ///
    /// Deployment is confirmed via receipt polling before the execution
    /// transaction is built; the owner signature covers the hash computed
    /// over the replay counter read immediately prior.
    pub async fn execute_direct(
        &self,
        chain_id: u64,
        account_spec: &MultiOwnerAccount,
        target: TransferTarget,
        signer: &dyn OwnerSigner,
        execution: &dyn ExecutionTransport,
    ) -> Result<TransactionOutcome, WalletError> {
        let profile = self.profile(chain_id)?;
        let sorted = sorted_owner_set(&account_spec.owners, account_spec.threshold)?;
        let account = derive_multi_owner_address(
            &account_spec.owners,
            account_spec.threshold,
            account_spec.salt_nonce,
            &profile.deployment,
        )?;

        let evm = EvmClient::new(&profile.rpc_url)?;
        if !evm.is_deployed(account).await? {
            info!(phase = ?SubmissionPhase::Deploying, %account, "deploying account proxy");
            let deploy_call = calls::create_proxy_with_nonce(
                &sorted,
                account_spec.threshold,
                account_spec.salt_nonce,
                &profile.deployment,
            );
            let outcome = execution
                .send_call(chain_id, &deploy_call)
                .await
                .map_err(map_submission_error)?;
            let confirmed = evm
                .wait_for_receipt(
                    &outcome.transaction_hash,
                    DEPLOY_RECEIPT_ATTEMPTS,
                    DEPLOY_RECEIPT_INTERVAL,
                )
                .await?;
            if !confirmed {
                return Err(WalletError::SubmissionFailed(
                    "account deployment reverted".to_string(),
                ));
            }
            info!(phase = ?SubmissionPhase::Deployed, %account, "account proxy deployed");
        }

        let call = target_call(&target);
        self.execute_on_account(profile, account, call, signer, execution)
            .await
    }

    /// Signs and submits one call through a deployed account's direct
    /// execute entry point.
    async fn execute_on_account(
        &self,
        profile: &ChainProfile,
        account: Address,
        call: Call,
        signer: &dyn OwnerSigner,
        execution: &dyn ExecutionTransport,
    ) -> Result<TransactionOutcome, WalletError> {
        let evm = EvmClient::new(&profile.rpc_url)?;

        // Registered ownership is a precondition checked against current
        // chain state, not against the derivation inputs.
        if !evm.is_owner(account, signer.address()).await? {
            return Err(WalletError::NotAnOwner(signer.address()));
        }

        let nonce = evm.get_nonce(account).await?;
        let tx = SafeTransaction::for_call(call.to, call.value, call.data, nonce);
        let hash = transaction_hash(&tx, profile.chain_id, account);

        info!(phase = ?SubmissionPhase::Signing, %account, nonce, "signing transaction hash");
        let mut signature = signer.sign_hash(&hash).await?;
        adjust_recovery_byte(&mut signature, signer.scheme());

        let exec_call = calls::exec_transaction(account, &tx, &signature);
        let outcome = execution
            .send_call(profile.chain_id, &exec_call)
            .await
            .map_err(map_submission_error)?;
        info!(
            phase = ?SubmissionPhase::Submitted,
            transaction_hash = %outcome.transaction_hash,
            "direct execution submitted"
        );
        Ok(outcome)
    }

    // ========================================================================
    // OWNER MANAGEMENT
    // ========================================================================

    /// Adds an owner to a deployed account via the direct path.
    pub async fn add_owner(
        &self,
        chain_id: u64,
        account: Address,
        new_owner: Address,
        new_threshold: u64,
        signer: &dyn OwnerSigner,
        execution: &dyn ExecutionTransport,
    ) -> Result<TransactionOutcome, WalletError> {
        let profile = self.profile(chain_id)?;
        let call = calls::add_owner_with_threshold(account, new_owner, new_threshold);
        self.execute_on_account(profile, account, call, signer, execution)
            .await
    }

    /// Removes an owner from a deployed account via the direct path.
    ///
    /// The predecessor pointer is computed from a fresh owner read; the
    /// list is never assumed to be stale-safe.
    pub async fn remove_owner(
        &self,
        chain_id: u64,
        account: Address,
        owner: Address,
        new_threshold: u64,
        signer: &dyn OwnerSigner,
        execution: &dyn ExecutionTransport,
    ) -> Result<TransactionOutcome, WalletError> {
        let profile = self.profile(chain_id)?;
        let evm = EvmClient::new(&profile.rpc_url)?;
        let owners = evm.get_owners(account).await?;
        let prev_owner = calls::linked_list_predecessor(&owners, owner)
            .ok_or(WalletError::NotAnOwner(owner))?;
        let call = calls::remove_owner(account, prev_owner, owner, new_threshold);
        self.execute_on_account(profile, account, call, signer, execution)
            .await
    }

    /// Reads the current owner set and threshold of a deployed account.
    pub async fn owner_set(
        &self,
        chain_id: u64,
        account: Address,
    ) -> Result<RecoveryOwnerSet, WalletError> {
        let profile = self.profile(chain_id)?;
        let evm = EvmClient::new(&profile.rpc_url)?;
        Ok(RecoveryOwnerSet {
            owners: evm.get_owners(account).await?,
            threshold: evm.get_threshold(account).await?,
        })
    }

    // ========================================================================
    // ACCOUNT DESCRIPTORS
    // ========================================================================

    /// Derives a single-owner account address and probes its deployment.
    pub async fn single_owner_descriptor(
        &self,
        chain_id: u64,
        owner: OwnerMaterial<'_>,
        salt_nonce: u128,
    ) -> Result<SmartAccountDescriptor, WalletError> {
        let profile = self.profile(chain_id)?;
        let address = derive_single_owner_address(owner, salt_nonce, &profile.deployment);
        let evm = EvmClient::new(&profile.rpc_url)?;
        Ok(SmartAccountDescriptor {
            chain_id,
            address,
            is_deployed: evm.is_deployed(address).await?,
        })
    }

    /// Derives a multi-owner account address and probes its deployment.
    pub async fn multi_owner_descriptor(
        &self,
        chain_id: u64,
        account_spec: &MultiOwnerAccount,
    ) -> Result<SmartAccountDescriptor, WalletError> {
        let profile = self.profile(chain_id)?;
        let address = derive_multi_owner_address(
            &account_spec.owners,
            account_spec.threshold,
            account_spec.salt_nonce,
            &profile.deployment,
        )?;
        let evm = EvmClient::new(&profile.rpc_url)?;
        Ok(SmartAccountDescriptor {
            chain_id,
            address,
            is_deployed: evm.is_deployed(address).await?,
        })
    }
}

/// Materializes the request target as a call.
fn target_call(target: &TransferTarget) -> Call {
    match target {
        TransferTarget::Call { to, value, data } => Call {
            to: *to,
            value: *value,
            data: data.clone(),
        },
        TransferTarget::Token { token, to, amount } => {
            calls::erc20_transfer(*token, *to, *amount)
        }
    }
}

/// Fixed gas limits for non-simulatable signers, scaled by batch size.
fn fixed_gas_limits(call_count: usize) -> GasOverrides {
    GasOverrides {
        call_gas_limit: PASSKEY_CALL_GAS_PER_CALL * call_count as u64,
        verification_gas_limit: PASSKEY_VERIFICATION_GAS,
        pre_verification_gas: PASSKEY_PRE_VERIFICATION_GAS,
    }
}
