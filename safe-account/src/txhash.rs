//! Transaction Hash / Domain Separator Builder
//!
//! Computes the typed hash an account owner signs to authorize a
//! multi-signature transaction: a struct hash over the transaction
//! fields, then a domain-prefixed final hash keyed by chain id and
//! account address. The on-chain contract computes the same value; any
//! divergence breaks every owner signature silently, so this module is
//! covered by determinism tests and can be cross-checked against the
//! chain client's `getTransactionHash` view.

use crate::abi;
use crate::hash::{keccak256, keccak256_concat};
use crate::primitives::Address;

/// Regular call operation.
pub const OPERATION_CALL: u8 = 0;
/// Delegate-call operation.
pub const OPERATION_DELEGATECALL: u8 = 1;

const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";
const SAFE_TX_TYPE: &str = "SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";

/// One multi-signature transaction as hashed for owner signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTransaction {
    pub to: Address,
    pub value: u128,
    pub data: Vec<u8>,
    pub operation: u8,
    pub safe_tx_gas: u128,
    pub base_gas: u128,
    pub gas_price: u128,
    pub gas_token: Address,
    pub refund_receiver: Address,
    /// On-chain replay counter, read immediately before signing
    pub nonce: u64,
}

impl SafeTransaction {
    /// A plain call with no gas refund parameters.
    pub fn for_call(to: Address, value: u128, data: Vec<u8>, nonce: u64) -> Self {
        Self {
            to,
            value,
            data,
            operation: OPERATION_CALL,
            safe_tx_gas: 0,
            base_gas: 0,
            gas_price: 0,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce,
        }
    }
}

/// Computes the domain separator for an account on a chain.
pub fn domain_separator(chain_id: u64, verifying_contract: Address) -> [u8; 32] {
    keccak256_concat(&[
        &keccak256(DOMAIN_TYPE.as_bytes()),
        &abi::u64_word(chain_id),
        &abi::address_word(verifying_contract),
    ])
}

/// Computes the hash every owner signature covers.
///
/// Identical inputs on an identical chain always yield the identical
/// hash. The dynamic `data` field enters through its own keccak hash,
/// per the typed-data encoding rules.
pub fn transaction_hash(
    tx: &SafeTransaction,
    chain_id: u64,
    verifying_contract: Address,
) -> [u8; 32] {
    let struct_hash = keccak256_concat(&[
        &keccak256(SAFE_TX_TYPE.as_bytes()),
        &abi::address_word(tx.to),
        &abi::u128_word(tx.value),
        &keccak256(&tx.data),
        &abi::u8_word(tx.operation),
        &abi::u128_word(tx.safe_tx_gas),
        &abi::u128_word(tx.base_gas),
        &abi::u128_word(tx.gas_price),
        &abi::address_word(tx.gas_token),
        &abi::address_word(tx.refund_receiver),
        &abi::u64_word(tx.nonce),
    ]);

    keccak256_concat(&[
        &[0x19, 0x01],
        &domain_separator(chain_id, verifying_contract),
        &struct_hash,
    ])
}
