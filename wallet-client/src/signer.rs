//! Owner Signers
//!
//! A local secp256k1 owner key for the direct-execution path, plus the
//! user-operation signers that bridge owner keys and passkeys into the
//! account-abstraction transport's digest signing step.

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};

use passkey_signer::{encode_assertion, PasskeyCredential};
use safe_account::Address;

use crate::authenticator::{authenticate, AuthenticationStrategy};
use crate::error::WalletError;
use crate::transport::{
    OwnerSigner, PlatformAuthenticator, SignatureScheme, UserOperationSigner,
};

/// Normalizes a signature's recovery byte into the contract's range.
///
/// Recovery ids 0/1 become 27/28; prefixed-message signatures get the
/// additional +4 the verifier uses to distinguish the scheme.
pub fn adjust_recovery_byte(signature: &mut [u8; 65], scheme: SignatureScheme) {
    if signature[64] < 27 {
        signature[64] += 27;
    }
    if scheme == SignatureScheme::EthSign && signature[64] < 31 {
        signature[64] += 4;
    }
}

/// An in-process secp256k1 owner key.
pub struct LocalOwnerSigner {
    key: SigningKey,
    address: Address,
    scheme: SignatureScheme,
}

impl LocalOwnerSigner {
    /// Creates a signer from raw key bytes, signing raw hashes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, WalletError> {
        Self::with_scheme(bytes, SignatureScheme::Ecdsa)
    }

    /// Creates a signer with an explicit recovery-byte scheme.
    pub fn with_scheme(bytes: &[u8; 32], scheme: SignatureScheme) -> Result<Self, WalletError> {
        let key = SigningKey::from_slice(bytes)
            .map_err(|e| WalletError::Decode(format!("invalid secp256k1 key: {e}")))?;
        let address = address_of(&key);
        Ok(Self {
            key,
            address,
            scheme,
        })
    }
}

/// Derives the EVM address of a secp256k1 key.
fn address_of(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    let mut hasher = Keccak256::new();
    hasher.update(&point.as_bytes()[1..]);
    let digest = hasher.finalize();
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address(out)
}

/// Applies the prefixed-message wrapping used by the eth_sign scheme.
fn prefixed_hash(hash: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n32");
    hasher.update(hash);
    hasher.finalize().into()
}

#[async_trait]
impl OwnerSigner for LocalOwnerSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    async fn sign_hash(&self, hash: &[u8; 32]) -> Result<[u8; 65], WalletError> {
        let digest = match self.scheme {
            SignatureScheme::Ecdsa => *hash,
            SignatureScheme::EthSign => prefixed_hash(hash),
        };
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| WalletError::Decode(format!("signing failed: {e}")))?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(out)
    }
}

// ============================================================================
// USER-OPERATION SIGNERS
// ============================================================================

/// Signs operation digests with a passkey via the platform authenticator.
///
/// The authenticator prompt requires user interaction, so this signer
/// cannot be simulated; the assembler falls back to fixed gas limits.
pub struct PasskeyOperationSigner<'a> {
    authenticator: &'a dyn PlatformAuthenticator,
    credential: &'a PasskeyCredential,
}

impl<'a> PasskeyOperationSigner<'a> {
    pub fn new(
        authenticator: &'a dyn PlatformAuthenticator,
        credential: &'a PasskeyCredential,
    ) -> Self {
        Self {
            authenticator,
            credential,
        }
    }
}

#[async_trait]
impl UserOperationSigner for PasskeyOperationSigner<'_> {
    async fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, WalletError> {
        // Try the known credential first, then a discoverable one.
        let strategies = [
            AuthenticationStrategy::Credential(self.credential.credential_id.clone()),
            AuthenticationStrategy::Discoverable,
        ];
        let assertion = authenticate(self.authenticator, &strategies, digest).await?;
        Ok(encode_assertion(&assertion)?)
    }

    fn supports_simulation(&self) -> bool {
        false
    }
}

/// Signs operation digests with an externally-owned owner key.
pub struct EoaOperationSigner<'a> {
    signer: &'a dyn OwnerSigner,
}

impl<'a> EoaOperationSigner<'a> {
    pub fn new(signer: &'a dyn OwnerSigner) -> Self {
        Self { signer }
    }
}

#[async_trait]
impl UserOperationSigner for EoaOperationSigner<'_> {
    async fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, WalletError> {
        let mut signature = self.signer.sign_hash(digest).await?;
        adjust_recovery_byte(&mut signature, self.signer.scheme());
        Ok(signature.to_vec())
    }

    fn supports_simulation(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_byte_normalized() {
        let mut sig = [0u8; 65];
        adjust_recovery_byte(&mut sig, SignatureScheme::Ecdsa);
        assert_eq!(sig[64], 27);

        let mut sig = [0u8; 65];
        sig[64] = 1;
        adjust_recovery_byte(&mut sig, SignatureScheme::EthSign);
        assert_eq!(sig[64], 32);
    }

    #[test]
    fn already_adjusted_byte_untouched() {
        let mut sig = [0u8; 65];
        sig[64] = 28;
        adjust_recovery_byte(&mut sig, SignatureScheme::Ecdsa);
        assert_eq!(sig[64], 28);
    }

    #[test]
    fn local_signer_has_stable_address() {
        let first = LocalOwnerSigner::from_bytes(&[0x42; 32]).unwrap();
        let second = LocalOwnerSigner::from_bytes(&[0x42; 32]).unwrap();
        assert_eq!(first.address(), second.address());
        assert_ne!(first.address(), Address::ZERO);
    }
}
