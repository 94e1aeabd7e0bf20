//! Minimal ABI Encoding Helpers
//!
//! Covers exactly the call shapes the wallet builds: static words,
//! dynamic byte strings, and address arrays. Selectors are computed at
//! runtime by keccak-hashing the canonical signature string, the same
//! way event topics are derived elsewhere in the workspace.

use crate::hash::keccak256;
use crate::primitives::Address;

/// One ABI value in a call's argument list.
#[derive(Debug, Clone)]
pub enum Token {
    /// Any 32-byte static word (addresses, uints, bools)
    Word([u8; 32]),
    /// Dynamic `bytes`
    Bytes(Vec<u8>),
    /// Dynamic `address[]`
    AddressArray(Vec<Address>),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        !matches!(self, Token::Word(_))
    }
}

/// Computes the 4-byte function selector for a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encodes an address as a left-padded 32-byte word.
pub fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Encodes a u128 as a left-padded 32-byte word.
pub fn u128_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encodes a u64 as a left-padded 32-byte word.
pub fn u64_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encodes a u8 as a left-padded 32-byte word.
pub fn u8_word(value: u8) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[31] = value;
    word
}

/// ABI-encodes an argument list without a selector.
///
/// Static tokens land in the head; dynamic tokens leave an offset in the
/// head and append a length-prefixed, 32-byte-padded segment to the tail.
pub fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * 32;
    let mut head: Vec<u8> = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&u64_word((head_len + tail.len()) as u64));
            match token {
                Token::Bytes(bytes) => {
                    tail.extend_from_slice(&u64_word(bytes.len() as u64));
                    tail.extend_from_slice(bytes);
                    let padded = bytes.len().div_ceil(32) * 32;
                    tail.resize(tail.len() + padded - bytes.len(), 0);
                }
                Token::AddressArray(addresses) => {
                    tail.extend_from_slice(&u64_word(addresses.len() as u64));
                    for address in addresses {
                        tail.extend_from_slice(&address_word(*address));
                    }
                }
                Token::Word(_) => unreachable!(),
            }
        } else if let Token::Word(word) = token {
            head.extend_from_slice(word);
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Builds complete calldata: selector followed by the encoded arguments.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(&encode_tokens(tokens));
    data
}
