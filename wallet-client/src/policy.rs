//! Chain & Gas-Sponsorship Policy Selector
//!
//! State-free decision function mapping a chain profile and caller
//! options to a payment mode. The one special case is the bootstrap
//! override: on the single chain configured for fee-token payment, a
//! caller that explicitly requests sponsorship gets this transaction
//! sponsored AND an instruction for the assembler to prepend a fee-token
//! approval, so the next transaction can take the fee-token path.

use safe_account::Address;

use crate::config::{ChainProfile, SponsorshipMode};
use crate::transport::PaymentDescriptor;

/// Minimum fee-token allowance (in token base units) considered usable.
pub const MIN_FEE_TOKEN_ALLOWANCE: u128 = 10_000_000;

/// Approval amount granted during bootstrap.
pub const BOOTSTRAP_APPROVAL_AMOUNT: u128 = u128::MAX;

/// Caller-supplied payment options for one submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentOptions {
    /// Pay in the native asset regardless of chain policy.
    pub force_native_gas: bool,
    /// Request the one-time bootstrap sponsorship on the fee-token chain.
    pub force_sponsor: bool,
}

/// Resolved payment mode for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMode {
    Sponsored,
    FeeToken { token: Address },
    Native,
}

/// An approval the assembler must prepend to the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTokenApproval {
    pub token: Address,
    pub spender: Address,
    pub amount: u128,
}

/// The selector's full answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDecision {
    pub mode: PaymentMode,
    /// Present only when the bootstrap override fired.
    pub bootstrap_approval: Option<FeeTokenApproval>,
}

impl PaymentDecision {
    /// The descriptor handed to the transport. `None` = native payment.
    pub fn descriptor(&self) -> Option<PaymentDescriptor> {
        match &self.mode {
            PaymentMode::Sponsored => Some(PaymentDescriptor::Sponsored),
            PaymentMode::FeeToken { token } => {
                Some(PaymentDescriptor::FeeToken { token: *token })
            }
            PaymentMode::Native => None,
        }
    }
}

/// Resolves the payment mode for a chain and option set.
///
/// Precedence: the bootstrap override (explicit `force_sponsor` on the
/// fee-token chain) beats `force_native_gas`, which beats chain policy.
/// `force_sponsor` on any other chain is ignored; the bootstrap exception
/// exists only for the designated chain.
pub fn resolve_payment_mode(profile: &ChainProfile, options: &PaymentOptions) -> PaymentDecision {
    if options.force_sponsor && profile.sponsorship == SponsorshipMode::FeeToken {
        // Token and spender presence is enforced by config validation.
        let approval = profile.fee_token.zip(profile.fee_collector).map(
            |(token, spender)| FeeTokenApproval {
                token,
                spender,
                amount: BOOTSTRAP_APPROVAL_AMOUNT,
            },
        );
        return PaymentDecision {
            mode: PaymentMode::Sponsored,
            bootstrap_approval: approval,
        };
    }

    if options.force_native_gas {
        return PaymentDecision {
            mode: PaymentMode::Native,
            bootstrap_approval: None,
        };
    }

    let mode = match profile.sponsorship {
        SponsorshipMode::Sponsor => PaymentMode::Sponsored,
        SponsorshipMode::FeeToken => match profile.fee_token {
            Some(token) => PaymentMode::FeeToken { token },
            // Unvalidated profile without a token falls back to native.
            None => PaymentMode::Native,
        },
        SponsorshipMode::None => PaymentMode::Native,
    };
    PaymentDecision {
        mode,
        bootstrap_approval: None,
    }
}
