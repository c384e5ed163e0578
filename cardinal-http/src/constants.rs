//! HTTP-specific constants for Cardinal request signing.

pub use cardinal::proto::{CREATE_PERSONA_PATH, GAME_TX_PREFIX, WORLD_PATH};

/// Query parameter carrying the hex-encoded private key.
///
/// Generated SDKs cannot take extra init options, so the key rides along in
/// the URL. Prefer [`crate::SigningKey`] where possible: URLs end up in access
/// logs.
pub const PRIVATE_KEY_PARAM: &str = "_privateKey";

/// Query parameter carrying the namespace for the legacy signer variant.
pub const NAMESPACE_PARAM: &str = "_namespace";

/// Body field the signature is written to.
pub const SIGNATURE_FIELD: &str = "signature";

/// Body field holding the persona tag.
pub const PERSONA_TAG_FIELD: &str = "personaTag";

/// Body field holding the transaction payload.
pub const BODY_FIELD: &str = "body";

/// Default Cardinal HTTP port on a local deployment.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4040";
