//! Hex wire encoding of recoverable secp256k1 signatures.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::hex;
use serde::{Deserialize, Serialize};

use crate::error::{SignatureFormatError, SigningError};

/// A 65-byte recoverable signature as carried in the `signature` field.
///
/// Always 130 lowercase hex characters without a `0x` prefix: 32 bytes `r`,
/// 32 bytes `s`, then the recovery byte encoded `1b` (y-parity 0) or `1c`
/// (y-parity 1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignatureHex {
    hex: String,
    bytes: [u8; 65],
}

impl SignatureHex {
    /// Number of hex characters in an encoded signature.
    pub const HEX_LEN: usize = 130;

    /// Encodes raw `r ‖ s ‖ v` bytes.
    ///
    /// `v` may be given as y-parity (`0`/`1`) or in Electrum notation
    /// (`27`/`28`); both are written as `1b`/`1c`.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidSignatureParameters`] for any other
    /// recovery byte.
    pub fn from_rsv(bytes: &[u8; 65]) -> Result<Self, SigningError> {
        let mut normalized = *bytes;
        normalized[64] = electrum_v(bytes[64])
            .ok_or(SigningError::InvalidSignatureParameters(bytes[64]))?;
        Ok(Self {
            hex: hex::encode(normalized),
            bytes: normalized,
        })
    }

    /// Returns the encoded signature.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// Decodes back into `r ‖ s ‖ v` bytes with `v` in Electrum notation.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 65] {
        self.bytes
    }

    /// Y-parity of the signature point (`false` for `1b`, `true` for `1c`).
    #[must_use]
    pub const fn y_parity(&self) -> bool {
        self.bytes[64] == 28
    }
}

const fn electrum_v(v: u8) -> Option<u8> {
    match v {
        0 | 27 => Some(27),
        1 | 28 => Some(28),
        _ => None,
    }
}

impl FromStr for SignatureHex {
    type Err = SignatureFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != Self::HEX_LEN {
            return Err(SignatureFormatError::Length(digits.len()));
        }
        let mut bytes = [0u8; 65];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| SignatureFormatError::NotHex)?;
        Self::from_rsv(&bytes).map_err(|_| SignatureFormatError::RecoveryByte(bytes[64]))
    }
}

impl TryFrom<String> for SignatureHex {
    type Error = SignatureFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SignatureHex> for String {
    fn from(value: SignatureHex) -> Self {
        value.hex
    }
}

impl AsRef<str> for SignatureHex {
    fn as_ref(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for SignatureHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}
