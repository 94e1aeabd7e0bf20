//! DER ECDSA Signature Decoder
//!
//! WebAuthn assertions carry the ECDSA signature as a DER-encoded ASN.1
//! SEQUENCE of two INTEGERs. The on-chain verifier wants the two scalars
//! as fixed-width 32-byte words, so this module splits the sequence and
//! strips DER's sign-disambiguation padding.

use crate::error::PasskeyError;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;

/// The r and s components of an ECDSA signature, left-padded to 32 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdsaComponents {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// Decodes a DER-encoded ECDSA signature into its two scalar components.
///
/// A single leading zero byte used to keep the DER integer non-negative is
/// stripped; scalars shorter than 32 bytes are left-padded.
///
/// # Arguments
///
/// * `der` - DER-encoded signature bytes from a WebAuthn assertion
///
/// # Returns
///
/// * `Ok(EcdsaComponents)` - The r and s scalars
/// * `Err(PasskeyError::MalformedSignature)` - Tags are absent, lengths
///   overrun the buffer, or a scalar is wider than 32 bytes
pub fn decode_signature(der: &[u8]) -> Result<EcdsaComponents, PasskeyError> {
    let mut cursor = Cursor { bytes: der, pos: 0 };

    if cursor.next()? != TAG_SEQUENCE {
        return Err(malformed("missing SEQUENCE tag"));
    }
    let seq_len = cursor.read_length()?;
    let seq_end = cursor
        .pos
        .checked_add(seq_len)
        .filter(|end| *end <= der.len())
        .ok_or_else(|| malformed("sequence length overruns buffer"))?;

    let r = cursor.read_integer(seq_end)?;
    let s = cursor.read_integer(seq_end)?;

    if cursor.pos != seq_end {
        return Err(malformed("trailing bytes inside sequence"));
    }

    Ok(EcdsaComponents { r, s })
}

fn malformed(reason: &str) -> PasskeyError {
    PasskeyError::MalformedSignature(reason.to_string())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Result<u8, PasskeyError> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| malformed("unexpected end of input"))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads a DER length octet. Short form plus the one-byte long form is
    /// enough for a 70-odd-byte ECDSA signature.
    fn read_length(&mut self) -> Result<usize, PasskeyError> {
        let first = self.next()?;
        if first < 0x80 {
            Ok(first as usize)
        } else if first == 0x81 {
            Ok(self.next()? as usize)
        } else {
            Err(malformed("unsupported length form"))
        }
    }

    /// Reads one INTEGER ending no later than `limit` and normalizes it to
    /// a 32-byte big-endian scalar.
    fn read_integer(&mut self, limit: usize) -> Result<[u8; 32], PasskeyError> {
        if self.next()? != TAG_INTEGER {
            return Err(malformed("missing INTEGER tag"));
        }
        let len = self.read_length()?;
        if len == 0 {
            return Err(malformed("empty integer"));
        }
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= limit)
            .ok_or_else(|| malformed("integer length overruns sequence"))?;

        let mut scalar = &self.bytes[self.pos..end];
        self.pos = end;

        // DER prepends 0x00 when the top bit of the scalar is set.
        if scalar.len() > 1 && scalar[0] == 0x00 {
            scalar = &scalar[1..];
        }
        if scalar.len() > 32 {
            return Err(malformed("integer wider than 32 bytes"));
        }

        let mut padded = [0u8; 32];
        padded[32 - scalar.len()..].copy_from_slice(scalar);
        Ok(padded)
    }
}
