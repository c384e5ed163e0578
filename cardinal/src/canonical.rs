//! Canonical message construction.
//!
//! A signed Cardinal transaction commits to
//! `personaTag ++ namespace ++ nonce ++ json`, where the nonce is pinned to
//! [`LEGACY_NONCE`] and `json` is compact JSON. The builders here never
//! reorder keys and never inject timestamps, so identical inputs always give an
//! identical message.
//!
//! Empty persona tags and namespaces are signed as-is: the backend rejects
//! them, the client does not.

use serde_json::Value;

use crate::proto::PersonaSigner;

/// Nonce slot of the message. The backend no longer validates it but still
/// expects the digit to be present.
pub const LEGACY_NONCE: &str = "0";

/// Builds the message signed when registering a persona.
///
/// The JSON part is `{"personaTag":…,"signerAddress":…}` in that order.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if the signer record cannot be serialized.
pub fn persona_creation_message(
    persona_tag: &str,
    namespace: &str,
    signer: &PersonaSigner,
) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(signer)?;
    Ok(join(persona_tag, namespace, &json))
}

/// Builds the message signed for a game transaction.
///
/// The payload is serialized with its own key order.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if the payload cannot be serialized.
pub fn game_transaction_message(
    persona_tag: &str,
    namespace: &str,
    payload: &Value,
) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(payload)?;
    Ok(join(persona_tag, namespace, &json))
}

fn join(persona_tag: &str, namespace: &str, json: &str) -> String {
    let mut message =
        String::with_capacity(persona_tag.len() + namespace.len() + LEGACY_NONCE.len() + json.len());
    message.push_str(persona_tag);
    message.push_str(namespace);
    message.push_str(LEGACY_NONCE);
    message.push_str(json);
    message
}
