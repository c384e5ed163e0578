//! Error types for the HTTP signing layer.

use std::sync::Arc;

use cardinal::SigningError;
use http::StatusCode;

/// Errors that can occur while fetching the world namespace.
#[derive(Debug, thiserror::Error)]
pub enum NamespaceError {
    /// The world endpoint URL could not be built.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The world endpoint answered with a non-success status.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// The body of a non-success response could not be read.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The response was not JSON or had no `namespace` string.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

/// Errors raised while intercepting an outgoing request.
///
/// Any of these aborts the request before it reaches the transport.
#[derive(Debug, thiserror::Error)]
pub enum InterceptError {
    /// The namespace could not be resolved. Nothing was cached; a later
    /// request fetches again.
    #[error("namespace unavailable: {0}")]
    NamespaceUnavailable(#[source] Arc<NamespaceError>),

    /// No usable private key was supplied with the request.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(&'static str),

    /// The signer produced a recovery indicator other than 27 or 28.
    #[error("unexpected signature recovery byte {0:#04x}")]
    InvalidSignatureParameters(u8),

    /// The body of a signable request is not a JSON object.
    #[error("request body is not a JSON object: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// The body is a stream and cannot be read before sending.
    #[error("request body is not buffered and cannot be signed")]
    UnbufferedBody,

    /// Any other signing failure.
    #[error("signing failed: {0}")]
    Signing(#[source] SigningError),
}

impl From<SigningError> for InterceptError {
    fn from(err: SigningError) -> Self {
        match err {
            SigningError::InvalidPrivateKey(reason) => Self::InvalidPrivateKey(reason),
            SigningError::InvalidSignatureParameters(v) => Self::InvalidSignatureParameters(v),
            other => Self::Signing(other),
        }
    }
}

/// Errors returned by [`crate::WorldClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An endpoint URL could not be built.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// The request failed in the middleware chain or the transport.
    #[error("request failed: {context}: {source}")]
    Request {
        /// Human-readable context.
        context: &'static str,
        /// The underlying middleware error.
        #[source]
        source: reqwest_middleware::Error,
    },
    /// Unexpected HTTP status code.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// JSON deserialization error.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Failed to read response body.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// Returns the interceptor error that aborted the request, if any.
    #[must_use]
    pub fn intercept_error(&self) -> Option<&InterceptError> {
        match self {
            Self::Request {
                source: reqwest_middleware::Error::Middleware(err),
                ..
            } => err.downcast_ref::<InterceptError>(),
            _ => None,
        }
    }
}
