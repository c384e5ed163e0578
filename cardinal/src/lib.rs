#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for signing Cardinal game-backend transactions.
//!
//! This crate is transport-agnostic: it knows which routes carry signed
//! transactions, what their JSON envelopes look like, and how to turn an
//! envelope into the exact message a persona key signs. Curve arithmetic lives
//! in `cardinal-evm`, request rewriting lives in `cardinal-http`.
//!
//! # Modules
//!
//! - [`proto`] - Route paths, request envelopes and response shapes
//! - [`canonical`] - Deterministic message construction
//! - [`signature`] - The hex wire encoding of recoverable signatures
//! - [`signer`] - The [`MessageSigner`] seam implemented by key types
//! - [`error`] - Signing and signature-format errors

pub mod canonical;
pub mod error;
pub mod proto;
pub mod signature;
pub mod signer;

pub use error::{SignatureFormatError, SigningError};
pub use proto::TxKind;
pub use signature::SignatureHex;
pub use signer::MessageSigner;
