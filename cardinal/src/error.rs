//! Error types for message signing.

/// Errors that can occur while producing a signature.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The private key is missing, not hex, the wrong length, or not a valid
    /// secp256k1 scalar.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(&'static str),

    /// The signature carried a recovery indicator other than y-parity 0 or 1.
    #[error("unexpected signature recovery byte {0:#04x}")]
    InvalidSignatureParameters(u8),

    /// A JSON payload could not be serialized into the canonical message.
    #[error("failed to serialize message payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The underlying ECDSA backend refused to sign.
    #[error("signing backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that can occur while parsing a hex-encoded signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureFormatError {
    /// The signature is not exactly 130 hex characters.
    #[error("expected 130 hex characters, got {0}")]
    Length(usize),

    /// The signature contains non-hex characters.
    #[error("signature is not valid hex")]
    NotHex,

    /// The recovery byte is neither `0`/`1` nor `27`/`28`.
    #[error("unexpected recovery byte {0:#04x}")]
    RecoveryByte(u8),
}
