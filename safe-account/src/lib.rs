//! Smart-Account Derivation Library
//!
//! This crate computes counterfactual smart-account addresses and the
//! typed transaction hashes that account owners sign. Everything is a
//! pure function of its inputs: no network access, no deployment
//! queries. An account's address is fixed at genesis by {sorted owner
//! set, threshold, per-chain contract constants, salt} and is never
//! recomputed from post-deployment owner state.

pub mod abi;
pub mod address;
pub mod error;
pub mod hash;
pub mod primitives;
pub mod txhash;

pub use address::{
    create2_address, derive_multi_owner_address, derive_single_owner_address,
    multi_owner_initializer, sorted_owner_set, OwnerMaterial, SafeDeployment,
};
pub use error::AccountError;
pub use hash::keccak256;
pub use primitives::Address;
pub use txhash::{domain_separator, transaction_hash, SafeTransaction, OPERATION_CALL};
