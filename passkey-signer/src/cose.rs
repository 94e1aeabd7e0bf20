//! COSE/CBOR Public Key Parser
//!
//! Decodes the base64-encoded COSE key structure returned by a WebAuthn
//! attestation into raw P-256 curve coordinates. Only the minimal CBOR
//! subset that authenticators actually emit is supported: definite-length
//! maps, integer keys/values in the one- and two-byte encodings, and byte
//! strings with short, one-byte or two-byte length prefixes.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::PasskeyError;

// COSE key map labels (RFC 9052 / RFC 9053)
const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_CRV: i64 = -1;
const LABEL_X: i64 = -2;
const LABEL_Y: i64 = -3;

// Expected values for a WebAuthn ES256 key
const KTY_EC2: i64 = 2;
const ALG_ES256: i64 = -7;
const CRV_P256: i64 = 1;

/// P-256 public key coordinates extracted from a passkey credential.
///
/// Derived once from a parsed credential; used only to compute signer and
/// account addresses, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct P256PublicKey {
    /// X coordinate, 32-byte big-endian unsigned integer
    pub x: [u8; 32],
    /// Y coordinate, 32-byte big-endian unsigned integer
    pub y: [u8; 32],
}

impl P256PublicKey {
    /// Returns the x coordinate as a 0x-prefixed hex string.
    pub fn x_hex(&self) -> String {
        format!("0x{}", hex::encode(self.x))
    }

    /// Returns the y coordinate as a 0x-prefixed hex string.
    pub fn y_hex(&self) -> String {
        format!("0x{}", hex::encode(self.y))
    }
}

/// A passkey credential as handed over by the authentication layer.
///
/// The credential id is an opaque identifier chosen by the authenticator;
/// the public key is the parsed COSE material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasskeyCredential {
    /// Opaque credential identifier (base64url, as surfaced by WebAuthn)
    pub credential_id: String,
    /// Parsed P-256 public key of the credential
    pub public_key: P256PublicKey,
}

/// Decodes a base64-encoded COSE key blob into P-256 coordinates.
///
/// Accepts base64url (unpadded) input as surfaced by WebAuthn APIs, with a
/// fallback to standard base64 for stored blobs.
///
/// # Arguments
///
/// * `blob` - Base64-encoded COSE key structure
///
/// # Returns
///
/// * `Ok(P256PublicKey)` - Extracted coordinates
/// * `Err(PasskeyError)` - Key is malformed, of the wrong type, or uses an
///   unsupported CBOR encoding
pub fn decode_public_key(blob: &str) -> Result<P256PublicKey, PasskeyError> {
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(blob)
        .or_else(|_| general_purpose::STANDARD.decode(blob))
        .map_err(|_| PasskeyError::InvalidKeyFormat("not valid base64".to_string()))?;
    decode_public_key_bytes(&bytes)
}

/// Decodes raw COSE key bytes into P-256 coordinates.
pub fn decode_public_key_bytes(bytes: &[u8]) -> Result<P256PublicKey, PasskeyError> {
    let mut reader = CborReader::new(bytes);
    let entries = reader.read_map_len()?;

    let mut kty: Option<i64> = None;
    let mut alg: Option<i64> = None;
    let mut crv: Option<i64> = None;
    let mut x: Option<Vec<u8>> = None;
    let mut y: Option<Vec<u8>> = None;

    for _ in 0..entries {
        let label = reader.read_int()?;
        match label {
            LABEL_KTY => kty = Some(reader.read_int()?),
            LABEL_ALG => alg = Some(reader.read_int()?),
            LABEL_CRV => crv = Some(reader.read_int()?),
            LABEL_X => x = Some(reader.read_byte_string()?),
            LABEL_Y => y = Some(reader.read_byte_string()?),
            _ => reader.skip_value()?,
        }
    }

    if kty != Some(KTY_EC2) {
        return Err(PasskeyError::InvalidKeyFormat(format!(
            "key type must be EC2, got {:?}",
            kty
        )));
    }
    if alg != Some(ALG_ES256) {
        return Err(PasskeyError::InvalidKeyFormat(format!(
            "algorithm must be ES256, got {:?}",
            alg
        )));
    }
    if crv != Some(CRV_P256) {
        return Err(PasskeyError::InvalidKeyFormat(format!(
            "curve must be P-256, got {:?}",
            crv
        )));
    }

    let x = coordinate(x, "x")?;
    let y = coordinate(y, "y")?;
    Ok(P256PublicKey { x, y })
}

/// Validates that a coordinate is present and exactly 32 bytes wide.
fn coordinate(value: Option<Vec<u8>>, name: &str) -> Result<[u8; 32], PasskeyError> {
    let bytes = value
        .ok_or_else(|| PasskeyError::InvalidKeyFormat(format!("missing {} coordinate", name)))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        PasskeyError::InvalidKeyFormat(format!(
            "{} coordinate must be 32 bytes, got {}",
            name,
            bytes.len()
        ))
    })
}

// ============================================================================
// MINIMAL CBOR READER
// ============================================================================

/// Cursor over a CBOR byte sequence supporting the WebAuthn subset.
struct CborReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

// CBOR major types
const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTE_STRING: u8 = 2;
const MAJOR_MAP: u8 = 5;

impl<'a> CborReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn next_byte(&mut self) -> Result<u8, PasskeyError> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| PasskeyError::UnsupportedEncoding("truncated input".to_string()))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads an item header, returning (major type, argument value).
    ///
    /// Supports immediate arguments (0..=23) and the one- and two-byte
    /// extended forms; longer forms never occur in attestation keys.
    fn read_head(&mut self) -> Result<(u8, u64), PasskeyError> {
        let initial = self.next_byte()?;
        let major = initial >> 5;
        let info = initial & 0x1f;
        let value = match info {
            0..=23 => info as u64,
            24 => self.next_byte()? as u64,
            25 => {
                let hi = self.next_byte()? as u64;
                let lo = self.next_byte()? as u64;
                (hi << 8) | lo
            }
            _ => {
                return Err(PasskeyError::UnsupportedEncoding(format!(
                    "length encoding 0x{:02x} not supported",
                    info
                )))
            }
        };
        Ok((major, value))
    }

    fn read_map_len(&mut self) -> Result<u64, PasskeyError> {
        let (major, len) = self.read_head()?;
        if major != MAJOR_MAP {
            return Err(PasskeyError::InvalidKeyFormat(
                "COSE key must be a CBOR map".to_string(),
            ));
        }
        Ok(len)
    }

    fn read_int(&mut self) -> Result<i64, PasskeyError> {
        let (major, value) = self.read_head()?;
        match major {
            MAJOR_UNSIGNED => Ok(value as i64),
            MAJOR_NEGATIVE => Ok(-1 - value as i64),
            _ => Err(PasskeyError::UnsupportedEncoding(format!(
                "expected integer, got major type {}",
                major
            ))),
        }
    }

    fn read_byte_string(&mut self) -> Result<Vec<u8>, PasskeyError> {
        let (major, len) = self.read_head()?;
        if major != MAJOR_BYTE_STRING {
            return Err(PasskeyError::UnsupportedEncoding(format!(
                "expected byte string, got major type {}",
                major
            )));
        }
        let len = len as usize;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| PasskeyError::UnsupportedEncoding("truncated input".to_string()))?;
        let slice = self.bytes[self.pos..end].to_vec();
        self.pos = end;
        Ok(slice)
    }

    /// Skips one value of any supported shape (unknown map labels).
    fn skip_value(&mut self) -> Result<(), PasskeyError> {
        let (major, value) = self.read_head()?;
        match major {
            MAJOR_UNSIGNED | MAJOR_NEGATIVE => Ok(()),
            MAJOR_BYTE_STRING => {
                let len = value as usize;
                let end = self
                    .pos
                    .checked_add(len)
                    .filter(|end| *end <= self.bytes.len())
                    .ok_or_else(|| {
                        PasskeyError::UnsupportedEncoding("truncated input".to_string())
                    })?;
                self.pos = end;
                Ok(())
            }
            _ => Err(PasskeyError::UnsupportedEncoding(format!(
                "cannot skip value of major type {}",
                major
            ))),
        }
    }
}
