//! The signing seam between message construction and key material.

use std::sync::Arc;

use crate::error::SigningError;
use crate::signature::SignatureHex;

/// Something that can sign canonical Cardinal messages.
///
/// Implementations hash the UTF-8 message with keccak256 and produce a
/// deterministic recoverable secp256k1 signature over the digest. The
/// `cardinal-evm` crate provides the local-key implementation.
pub trait MessageSigner: Send + Sync {
    /// EIP-55 checksummed address of the signing key.
    fn signer_address(&self) -> String;

    /// Signs a canonical message.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] if the backend fails or yields a signature with
    /// an unexpected recovery indicator.
    fn sign_message(&self, message: &str) -> Result<SignatureHex, SigningError>;
}

impl<T: MessageSigner + ?Sized> MessageSigner for Arc<T> {
    fn signer_address(&self) -> String {
        (**self).signer_address()
    }

    fn sign_message(&self, message: &str) -> Result<SignatureHex, SigningError> {
        (**self).sign_message(message)
    }
}

impl<T: MessageSigner + ?Sized> MessageSigner for &T {
    fn signer_address(&self) -> String {
        (**self).signer_address()
    }

    fn sign_message(&self, message: &str) -> Result<SignatureHex, SigningError> {
        (**self).sign_message(message)
    }
}
