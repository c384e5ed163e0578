//! CLI error type.

use cardinal::SigningError;
use cardinal_http::ClientError;

/// Errors that end a CLI invocation.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The command signs but no key was configured.
    #[error("no private key configured; pass --private-key or set CARDINAL_PRIVATE_KEY")]
    MissingKey,

    /// The configured key is not usable.
    #[error(transparent)]
    Key(#[from] SigningError),

    /// The world rejected the request or could not be reached.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Output could not be encoded.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
