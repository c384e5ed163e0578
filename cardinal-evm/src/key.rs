//! Local persona keys.

use std::fmt;

use alloy_primitives::{Address, B256, hex, keccak256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use cardinal::{MessageSigner, SignatureHex, SigningError};

/// A secp256k1 private key that signs on behalf of a persona.
///
/// The key material never appears in `Debug` output; only the derived address
/// does.
#[derive(Clone)]
pub struct PersonaKey {
    signer: PrivateKeySigner,
}

impl PersonaKey {
    /// Parses a 32-byte key from hex, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidPrivateKey`] if the input is empty, not
    /// 64 hex digits, or not a valid secp256k1 scalar.
    pub fn from_hex(key: &str) -> Result<Self, SigningError> {
        let key = key.trim();
        let digits = key.strip_prefix("0x").unwrap_or(key);
        if digits.is_empty() {
            return Err(SigningError::InvalidPrivateKey("key is empty"));
        }
        if digits.len() != 64 {
            return Err(SigningError::InvalidPrivateKey("expected 32 bytes of hex"));
        }
        let mut bytes = B256::ZERO;
        hex::decode_to_slice(digits, bytes.as_mut_slice())
            .map_err(|_| SigningError::InvalidPrivateKey("key is not hex"))?;
        Self::from_bytes(&bytes)
    }

    /// Builds a key from raw scalar bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidPrivateKey`] for zero or out-of-range
    /// scalars.
    pub fn from_bytes(bytes: &B256) -> Result<Self, SigningError> {
        PrivateKeySigner::from_bytes(bytes)
            .map(|signer| Self { signer })
            .map_err(|_| SigningError::InvalidPrivateKey("not a valid secp256k1 scalar"))
    }

    /// Address derived from the public key.
    #[must_use]
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs a 32-byte digest.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Backend`] if ECDSA signing fails and
    /// [`SigningError::InvalidSignatureParameters`] if the recovery byte is
    /// not 27 or 28.
    pub fn sign_digest(&self, digest: &B256) -> Result<SignatureHex, SigningError> {
        let signature = self
            .signer
            .sign_hash_sync(digest)
            .map_err(|e| SigningError::Backend(Box::new(e)))?;
        SignatureHex::from_rsv(&signature.as_bytes())
    }
}

impl MessageSigner for PersonaKey {
    fn signer_address(&self) -> String {
        self.address().to_checksum(None)
    }

    fn sign_message(&self, message: &str) -> Result<SignatureHex, SigningError> {
        self.sign_digest(&keccak256(message.as_bytes()))
    }
}

impl fmt::Debug for PersonaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonaKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
