//! Signature verification.
//!
//! The backend attributes a signed transaction to whichever address recovers
//! from `keccak256(message)` and the signature. These helpers perform the same
//! recovery client-side, which is how tests and tooling check a signature
//! without a round trip.

use alloy_primitives::{Address, Signature, SignatureError, keccak256};
use cardinal::{SignatureFormatError, SignatureHex};

/// Errors that can occur while verifying a signature.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The signature text is not a valid encoded signature.
    #[error("malformed signature: {0}")]
    Format(#[from] SignatureFormatError),

    /// No public key could be recovered from the signature and digest.
    #[error("signer recovery failed: {0}")]
    Recovery(#[source] SignatureError),

    /// The recovered signer is not the expected address.
    #[error("signature was produced by {recovered}, expected {expected}")]
    SignerMismatch {
        /// Address the caller expected.
        expected: Address,
        /// Address recovered from the signature.
        recovered: Address,
    },
}

/// Recovers the address that signed `message`.
///
/// # Errors
///
/// Returns [`VerifyError::Recovery`] if the signature does not describe a
/// valid curve point for the message digest.
pub fn recover_signer(message: &str, signature: &SignatureHex) -> Result<Address, VerifyError> {
    let parsed = Signature::from_raw_array(&signature.to_bytes()).map_err(VerifyError::Recovery)?;
    parsed
        .recover_address_from_prehash(&keccak256(message.as_bytes()))
        .map_err(VerifyError::Recovery)
}

/// Checks that `signature` over `message` was produced by `expected`.
///
/// # Errors
///
/// Returns [`VerifyError::SignerMismatch`] when a different key signed, or
/// [`VerifyError::Recovery`] when nothing can be recovered.
pub fn verify(message: &str, signature: &SignatureHex, expected: Address) -> Result<(), VerifyError> {
    let recovered = recover_signer(message, signature)?;
    if recovered == expected {
        Ok(())
    } else {
        Err(VerifyError::SignerMismatch {
            expected,
            recovered,
        })
    }
}

/// Like [`verify`], for a signature still in its wire form.
///
/// # Errors
///
/// Returns [`VerifyError::Format`] if `signature` cannot be parsed, otherwise
/// as [`verify`].
pub fn verify_hex(message: &str, signature: &str, expected: Address) -> Result<(), VerifyError> {
    let signature: SignatureHex = signature.parse()?;
    verify(message, &signature, expected)
}
