//! Counterfactual Account Address Derivation
//!
//! Computes CREATE2-style contract addresses for both account families
//! before anything is deployed. The derivation never touches the network;
//! deployment status is a separate, point-in-time observation made by the
//! chain client.

use passkey_signer::P256PublicKey;
use serde::{Deserialize, Serialize};

use crate::abi::{self, Token};
use crate::error::AccountError;
use crate::hash::{keccak256, keccak256_concat};
use crate::primitives::{hex_bytes, hex_word, Address};

/// Per-chain contract constants for account deployment.
///
/// Loaded from static configuration; the values pin which factory,
/// singleton and handler contracts an address is derived against and
/// therefore which address a given owner set maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeDeployment {
    /// Proxy factory performing the CREATE2 deployment
    pub proxy_factory: Address,
    /// Singleton implementation the proxy delegates to
    pub singleton: Address,
    /// Fallback handler wired into the setup call
    pub fallback_handler: Address,
    /// Creation bytecode of the proxy (constructor argument excluded)
    #[serde(with = "hex_bytes")]
    pub proxy_creation_code: Vec<u8>,
    /// Factory for single-owner account-abstraction accounts
    pub account_factory: Address,
    /// Init-code hash of the single-owner account, fixed per chain
    #[serde(with = "hex_word")]
    pub account_init_code_hash: [u8; 32],
    /// On-chain P-256 signature verifier for passkey owners
    pub webauthn_verifier: Address,
}

/// Owner material a single-owner account is keyed on.
#[derive(Debug, Clone, Copy)]
pub enum OwnerMaterial<'a> {
    /// An externally-owned secp256k1 account
    Eoa(Address),
    /// A passkey, pinned to the chain's P-256 verifier
    Passkey {
        key: &'a P256PublicKey,
        verifier: Address,
    },
}

/// Computes a CREATE2 contract address.
///
/// `address = keccak256(0xff ++ deployer ++ salt ++ init_code_hash)[12..]`
pub fn create2_address(deployer: Address, salt: [u8; 32], init_code_hash: [u8; 32]) -> Address {
    let digest = keccak256_concat(&[&[0xff], deployer.as_bytes(), &salt, &init_code_hash]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address(out)
}

/// Builds the `setup(...)` initializer calldata for a multi-owner account.
///
/// Callers must pass the owners already sorted; the public derivation
/// entry point takes care of that.
pub fn multi_owner_initializer(
    sorted_owners: &[Address],
    threshold: u64,
    deployment: &SafeDeployment,
) -> Vec<u8> {
    abi::encode_call(
        "setup(address[],uint256,address,bytes,address,address,uint256,address)",
        &[
            Token::AddressArray(sorted_owners.to_vec()),
            Token::Word(abi::u64_word(threshold)),
            Token::Word(abi::address_word(Address::ZERO)),
            Token::Bytes(Vec::new()),
            Token::Word(abi::address_word(deployment.fallback_handler)),
            Token::Word(abi::address_word(Address::ZERO)),
            Token::Word(abi::u64_word(0)),
            Token::Word(abi::address_word(Address::ZERO)),
        ],
    )
}

/// Derives the counterfactual address of a multi-owner account.
///
/// Owners are sorted bytewise before hashing, so two callers providing
/// the same set in different order derive the same address. The salt
/// binds the initializer hash and the caller-supplied salt nonce; the
/// init-code hash binds the proxy bytecode and the singleton.
///
/// # Arguments
///
/// * `owners` - Owner addresses, in any order
/// * `threshold` - Number of owner signatures required, in `[1, len]`
/// * `salt_nonce` - Caller-chosen nonce distinguishing parallel accounts
/// * `deployment` - Per-chain contract constants
///
/// # Returns
///
/// * `Ok(Address)` - The counterfactual account address
/// * `Err(AccountError)` - Empty/duplicated owner set or bad threshold
pub fn derive_multi_owner_address(
    owners: &[Address],
    threshold: u64,
    salt_nonce: u128,
    deployment: &SafeDeployment,
) -> Result<Address, AccountError> {
    let sorted = sorted_owner_set(owners, threshold)?;

    let initializer = multi_owner_initializer(&sorted, threshold, deployment);
    let salt = keccak256_concat(&[&keccak256(&initializer), &abi::u128_word(salt_nonce)]);

    let init_code_hash = keccak256_concat(&[
        &deployment.proxy_creation_code,
        &abi::address_word(deployment.singleton),
    ]);

    Ok(create2_address(deployment.proxy_factory, salt, init_code_hash))
}

/// Validates and sorts an owner set.
pub fn sorted_owner_set(owners: &[Address], threshold: u64) -> Result<Vec<Address>, AccountError> {
    if owners.is_empty() {
        return Err(AccountError::InvalidOwnerSet("owner list is empty"));
    }
    let mut sorted = owners.to_vec();
    sorted.sort();
    if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(AccountError::InvalidOwnerSet("duplicate owner address"));
    }
    if threshold == 0 || threshold > owners.len() as u64 {
        return Err(AccountError::InvalidThreshold {
            threshold,
            owners: owners.len(),
        });
    }
    Ok(sorted)
}

/// Derives the counterfactual address of a single-owner account.
///
/// The salt commits to the owner material (an EOA address, or passkey
/// coordinates pinned to the chain's verifier) plus a salt nonce; the
/// factory and init-code hash are per-chain constants. Zero salt nonce is
/// the default account.
pub fn derive_single_owner_address(
    owner: OwnerMaterial<'_>,
    salt_nonce: u128,
    deployment: &SafeDeployment,
) -> Address {
    let salt = match owner {
        OwnerMaterial::Eoa(address) => keccak256_concat(&[
            &abi::address_word(address),
            &abi::u128_word(salt_nonce),
        ]),
        OwnerMaterial::Passkey { key, verifier } => keccak256_concat(&[
            &key.x,
            &key.y,
            &abi::address_word(verifier),
            &abi::u128_word(salt_nonce),
        ]),
    };
    create2_address(
        deployment.account_factory,
        salt,
        deployment.account_init_code_hash,
    )
}
