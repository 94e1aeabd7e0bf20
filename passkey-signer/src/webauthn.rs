//! WebAuthn Signature Encoder
//!
//! Repacks a WebAuthn assertion into the byte layout the on-chain
//! signature verifier expects: the ABI encoding of the dynamic tuple
//! `(bytes authenticatorData, string clientDataFields, uint256 r,
//! uint256 s)`. The verifier re-assembles the client data JSON from the
//! fields that follow the challenge, hashes it together with the
//! authenticator data, and checks the P-256 signature over the result.
//!
//! The offset arithmetic here is correctness-critical: a wrong pad or
//! offset does not fail locally, it produces a signature the verifier
//! silently rejects. The byte layout is locked by golden tests.

use serde::{Deserialize, Serialize};

use crate::der::decode_signature;
use crate::error::PasskeyError;

/// One WebAuthn assertion as returned by the platform authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAuthnAssertion {
    /// Raw authenticator data (RP id hash, flags, counter, extensions)
    pub authenticator_data: Vec<u8>,
    /// Full clientDataJSON string, verbatim
    pub client_data_json: String,
    /// DER-encoded ECDSA signature over the authenticator payload
    pub signature: Vec<u8>,
}

/// Locates the client data fields that follow the challenge value.
///
/// Everything up to and including the `"challenge":"…"` pair and its
/// trailing comma is stripped, as is the object's closing brace, leaving
/// the remaining fields verbatim for the verifier to re-hash together
/// with the challenge it already knows.
///
/// # Returns
///
/// * `Ok(&str)` - The fields following the challenge, without braces
/// * `Err(PasskeyError::InvalidClientData)` - No challenge field present
pub fn extract_client_data_fields(client_data_json: &str) -> Result<&str, PasskeyError> {
    let marker = "\"challenge\":";
    let start = client_data_json
        .find(marker)
        .ok_or(PasskeyError::InvalidClientData)?
        + marker.len();
    let rest = &client_data_json[start..];

    // The challenge value is a base64url string; it contains no escapes,
    // so the next two quotes delimit it exactly.
    let open = rest.find('"').ok_or(PasskeyError::InvalidClientData)?;
    let close = rest[open + 1..]
        .find('"')
        .ok_or(PasskeyError::InvalidClientData)?
        + open
        + 1;

    let mut fields = &rest[close + 1..];
    fields = fields.strip_prefix(',').unwrap_or(fields);
    fields = fields.strip_suffix('}').unwrap_or(fields);
    Ok(fields)
}

/// ABI-encodes an assertion's parts into verifier-ready signature bytes.
///
/// Layout: a four-word head (offset to authenticatorData, offset to
/// clientDataFields, r, s) followed by the two length-prefixed dynamic
/// segments, each padded to a 32-byte boundary.
pub fn encode_signature(
    authenticator_data: &[u8],
    client_data_json: &str,
    r: &[u8; 32],
    s: &[u8; 32],
) -> Result<Vec<u8>, PasskeyError> {
    let fields = extract_client_data_fields(client_data_json)?;

    let auth_padded = pad32(authenticator_data.len());
    let fields_padded = pad32(fields.len());

    // Head is 4 words; first dynamic segment starts right after it.
    let auth_offset = 4 * 32;
    let fields_offset = auth_offset + 32 + auth_padded;

    let mut out = Vec::with_capacity(fields_offset + 32 + fields_padded);
    out.extend_from_slice(&offset_word(auth_offset));
    out.extend_from_slice(&offset_word(fields_offset));
    out.extend_from_slice(r);
    out.extend_from_slice(s);

    out.extend_from_slice(&offset_word(authenticator_data.len()));
    out.extend_from_slice(authenticator_data);
    out.resize(out.len() + auth_padded - authenticator_data.len(), 0);

    out.extend_from_slice(&offset_word(fields.len()));
    out.extend_from_slice(fields.as_bytes());
    out.resize(out.len() + fields_padded - fields.len(), 0);

    Ok(out)
}

/// Decodes the assertion's DER signature and ABI-encodes the result.
pub fn encode_assertion(assertion: &WebAuthnAssertion) -> Result<Vec<u8>, PasskeyError> {
    let components = decode_signature(&assertion.signature)?;
    encode_signature(
        &assertion.authenticator_data,
        &assertion.client_data_json,
        &components.r,
        &components.s,
    )
}

fn pad32(len: usize) -> usize {
    len.div_ceil(32) * 32
}

fn offset_word(value: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}
