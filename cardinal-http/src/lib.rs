#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client-side request signing for Cardinal worlds.
//!
//! Cardinal attributes a transaction to the key that signed it. This crate
//! signs outgoing requests transparently: install an [`InterceptorPipeline`]
//! on a reqwest client and every `POST /tx/persona/create-persona` and
//! `POST /tx/game/{name}` request is signed before it leaves. Other requests
//! pass through untouched.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cardinal_http::{
//!     InterceptorPipeline, NamespaceResolver, ReqwestWithSigning, ReqwestWithSigningBuild,
//!     SigningKey,
//! };
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Arc::new(NamespaceResolver::new());
//! let client = reqwest::Client::new()
//!     .with_signing(InterceptorPipeline::signing(resolver))
//!     .build();
//!
//! client
//!     .post("http://localhost:4040/tx/game/move")
//!     .with_extension(SigningKey::new(std::env::var("CARDINAL_PRIVATE_KEY")?))
//!     .json(&json!({ "personaTag": "alice", "body": { "direction": "up" } }))
//!     .send()
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`WorldClient`] wraps the same machinery in typed calls.
//!
//! # Modules
//!
//! - [`constants`] - Routes, query parameters and body fields
//! - [`error`] - Error types
//! - [`namespace`] - Cached, single-flight namespace lookup
//! - [`interceptor`] - The signing interceptor and the key extension
//! - [`middleware`] - reqwest-middleware integration
//! - [`client`] - Typed world client

pub mod client;
pub mod constants;
pub mod error;
pub mod interceptor;
pub mod middleware;
pub mod namespace;

pub use client::WorldClient;
pub use error::{ClientError, InterceptError, NamespaceError};
pub use interceptor::{
    NamespaceSource, PassthroughInterceptor, RequestInterceptor, SignerInterceptor, SigningKey,
};
pub use middleware::{
    InterceptorPipeline, ReqwestWithSigning, ReqwestWithSigningBuild, ReqwestWithSigningBuilder,
};
pub use namespace::NamespaceResolver;
