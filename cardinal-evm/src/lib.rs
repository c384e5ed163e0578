#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! secp256k1 signing for Cardinal transactions.
//!
//! Cardinal authenticates personas with Ethereum-style keys: a message is
//! hashed with keccak256, signed with deterministic (RFC 6979) ECDSA over
//! secp256k1, and attributed to the EIP-55 address of the signing key.
//!
//! - [`PersonaKey`] - a local private key implementing
//!   [`cardinal::MessageSigner`]
//! - [`verify`] - signer recovery and verification of produced signatures

pub mod key;
pub mod verify;

pub use key::PersonaKey;
pub use verify::{VerifyError, recover_signer};
