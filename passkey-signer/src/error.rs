//! Error types for passkey material parsing and encoding.

use thiserror::Error;

/// Errors produced while parsing passkey material or encoding signatures.
///
/// All of these indicate malformed or unsupported input. They are
/// deterministic for a given input and should fail the calling flow
/// immediately; retrying cannot succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasskeyError {
    /// The COSE key is not the EC2/ES256/P-256 shape WebAuthn attestation
    /// produces, or a coordinate has the wrong width.
    #[error("invalid COSE key: {0}")]
    InvalidKeyFormat(String),

    /// The CBOR input uses an encoding outside the minimal subset found in
    /// WebAuthn attestation responses.
    #[error("unsupported CBOR encoding: {0}")]
    UnsupportedEncoding(String),

    /// The DER signature is structurally invalid.
    #[error("malformed DER signature: {0}")]
    MalformedSignature(String),

    /// The clientDataJSON does not contain a locatable challenge field.
    #[error("invalid client data JSON: challenge field not found")]
    InvalidClientData,
}
