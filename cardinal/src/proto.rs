//! Wire shapes of the Cardinal transaction API.
//!
//! Only the routes that participate in signing are modelled here: the world
//! info endpoint (source of the namespace) and the two transaction routes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path of the world info endpoint, relative to the API origin.
pub const WORLD_PATH: &str = "/world";

/// Path of the persona-creation endpoint.
pub const CREATE_PERSONA_PATH: &str = "/tx/persona/create-persona";

/// Prefix shared by every game-transaction endpoint (`/tx/game/{txName}`).
pub const GAME_TX_PREFIX: &str = "/tx/game/";

/// The kind of signed transaction a route carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    /// `POST /tx/persona/create-persona`.
    CreatePersona,
    /// `POST /tx/game/{txName}`.
    GameTransaction,
}

impl TxKind {
    /// Classifies a URL path.
    ///
    /// The persona-creation path is matched exactly and checked first; any
    /// path under [`GAME_TX_PREFIX`] is a game transaction. Everything else is
    /// unsigned and yields `None`.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        if path == CREATE_PERSONA_PATH {
            Some(Self::CreatePersona)
        } else if path.starts_with(GAME_TX_PREFIX) {
            Some(Self::GameTransaction)
        } else {
            None
        }
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatePersona => "create-persona",
            Self::GameTransaction => "game-transaction",
        }
    }
}

/// The persona registration record: which address may sign for a tag.
///
/// Field order is part of the signed message and must stay `personaTag`,
/// `signerAddress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaSigner {
    /// The persona tag being registered.
    pub persona_tag: String,
    /// EIP-55 checksummed address of the key that signs for the persona.
    pub signer_address: String,
}

/// Unsigned body of a persona-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonaRequest {
    /// The persona tag to register.
    pub persona_tag: String,
}

/// Unsigned body of a game-transaction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTransactionRequest {
    /// The persona submitting the transaction.
    pub persona_tag: String,
    /// Game-defined transaction payload.
    pub body: Value,
}

/// Response of `GET /world`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldInfo {
    /// Namespace a signed message must be bound to for this deployment.
    pub namespace: String,
}

/// Response of a transaction submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// Hash assigned to the transaction by the backend.
    pub tx_hash: String,
    /// Tick in which the transaction will be processed.
    pub tick: u64,
}
