//! Passkey Signing Material Library
//!
//! This crate handles the parsing and re-encoding of WebAuthn passkey
//! material used by the smart-account wallet: COSE/CBOR public key
//! extraction, DER ECDSA signature decoding, and the ABI byte layout
//! expected by the on-chain WebAuthn signature verifier.
//!
//! Everything in this crate is pure: no network access, no side effects.
//! Parsing failures are terminal and never retried by callers.

pub mod cose;
pub mod der;
pub mod error;
pub mod webauthn;

pub use cose::{decode_public_key, P256PublicKey, PasskeyCredential};
pub use der::{decode_signature, EcdsaComponents};
pub use error::PasskeyError;
pub use webauthn::{
    encode_assertion, encode_signature, extract_client_data_fields, WebAuthnAssertion,
};
