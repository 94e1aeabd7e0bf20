//! Fixed-width EVM primitives.
//!
//! Chain-facing code in this workspace passes addresses around as typed
//! 20-byte values and serializes them back to the 0x-prefixed lowercase
//! hex strings the JSON-RPC layer speaks.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an address string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address {input:?}: {reason}")]
pub struct AddressParseError {
    pub input: String,
    pub reason: &'static str,
}

/// A 20-byte EVM address.
///
/// Ordering is bytewise, which matches the numeric ordering the owner
/// sort in the address derivation relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// Sentinel head of the on-chain owner linked list.
    pub const SENTINEL: Address = {
        let mut bytes = [0u8; 20];
        bytes[19] = 0x01;
        Address(bytes)
    };

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parses a 0x-prefixed or bare 40-character hex string.
    pub fn from_hex(input: &str) -> Result<Self, AddressParseError> {
        let stripped = input.strip_prefix("0x").unwrap_or(input);
        if stripped.len() != 40 {
            return Err(AddressParseError {
                input: input.to_string(),
                reason: "expected 40 hex characters",
            });
        }
        let bytes = hex::decode(stripped).map_err(|_| AddressParseError {
            input: input.to_string(),
            reason: "not valid hex",
        })?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Serde adapter for 32-byte words stored as 0x-prefixed hex.
pub mod hex_word {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(word: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(word)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes =
            hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(de::Error::custom)?;
        <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| de::Error::custom("expected 32 bytes"))
    }
}

/// Serde adapter for byte blobs stored as 0x-prefixed hex in config files.
pub mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(de::Error::custom)
    }
}
