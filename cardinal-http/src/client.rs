//! Typed client for a Cardinal world.
//!
//! [`WorldClient`] owns a middleware client with a [`SignerInterceptor`]
//! installed, so every transaction it submits is signed on the way out.

use std::fmt;
use std::sync::Arc;

use cardinal::proto::{
    CREATE_PERSONA_PATH, CreatePersonaRequest, GAME_TX_PREFIX, GameTransactionRequest,
    TxReceipt, WORLD_PATH, WorldInfo,
};
use reqwest::Client;
use reqwest_middleware as rqm;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{info, instrument};

use crate::constants::NAMESPACE_PARAM;
use crate::error::ClientError;
use crate::interceptor::{SignerInterceptor, SigningKey};
use crate::middleware::{InterceptorPipeline, ReqwestWithSigning, ReqwestWithSigningBuild};
use crate::namespace::NamespaceResolver;

/// Client for the HTTP API of one Cardinal world.
#[derive(Clone)]
pub struct WorldClient {
    base_url: Url,
    http: rqm::ClientWithMiddleware,
    resolver: Option<Arc<NamespaceResolver>>,
    query_namespace: Option<String>,
    signing_key: Option<SigningKey>,
}

impl fmt::Debug for WorldClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldClient")
            .field("base_url", &self.base_url.as_str())
            .field("resolver", &self.resolver)
            .field("query_namespace", &self.query_namespace)
            .field("signing_key", &self.signing_key)
            .finish_non_exhaustive()
    }
}

impl WorldClient {
    /// Creates a client for the world at `base_url`.
    ///
    /// The namespace is fetched from `GET /world` before the first signed
    /// request and cached for the lifetime of the client.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Like [`new`](Self::new), reusing an existing reqwest client.
    #[must_use]
    pub fn with_client(base_url: Url, client: Client) -> Self {
        let resolver = Arc::new(NamespaceResolver::with_client(client.clone()));
        let http = client
            .with_signing(InterceptorPipeline::signing(Arc::clone(&resolver)))
            .build();
        Self {
            base_url,
            http,
            resolver: Some(resolver),
            query_namespace: None,
            signing_key: None,
        }
    }

    /// Creates a client that signs with a namespace known up front.
    ///
    /// The namespace is appended to every request as `_namespace` and nothing
    /// is fetched. A namespace that does not match the world's produces
    /// signatures the world rejects.
    #[must_use]
    pub fn with_query_namespace(base_url: Url, namespace: impl Into<String>) -> Self {
        let http = Client::new()
            .with_signing(InterceptorPipeline::new().with(SignerInterceptor::with_query_namespace()))
            .build();
        Self {
            base_url,
            http,
            resolver: None,
            query_namespace: Some(namespace.into()),
            signing_key: None,
        }
    }

    /// Signs transactions with `key`.
    #[must_use]
    pub fn with_signing_key(mut self, key: SigningKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Returns the base URL of the world.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the namespace resolver, unless the namespace comes from the
    /// query string.
    pub const fn resolver(&self) -> Option<&Arc<NamespaceResolver>> {
        self.resolver.as_ref()
    }

    /// Sends `GET /world`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the reply is not world
    /// info.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardinal.client.world", skip_all, err)
    )]
    pub async fn world(&self) -> Result<WorldInfo, ClientError> {
        let url = self.endpoint(WORLD_PATH)?;
        let request = self.http.get(url);
        send_json(request, "GET /world").await
    }

    /// Claims `persona_tag` for the configured signing key.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`]; when signing failed the request was never
    /// sent and [`ClientError::intercept_error`] returns the cause.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardinal.client.create_persona", skip_all, err)
    )]
    pub async fn create_persona(&self, persona_tag: &str) -> Result<TxReceipt, ClientError> {
        let url = self.tx_url(CREATE_PERSONA_PATH)?;
        let payload = CreatePersonaRequest {
            persona_tag: persona_tag.to_owned(),
        };
        let receipt: TxReceipt =
            send_json(self.signed_post(url, &payload), "POST /tx/persona/create-persona").await?;

        #[cfg(feature = "telemetry")]
        info!(tx_hash = %receipt.tx_hash, tick = receipt.tick, "Persona creation submitted");

        Ok(receipt)
    }

    /// Submits the game transaction `name` on behalf of `persona_tag`.
    ///
    /// # Errors
    ///
    /// As [`create_persona`](Self::create_persona).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardinal.client.transact", skip_all, err)
    )]
    pub async fn transact(
        &self,
        name: &str,
        persona_tag: &str,
        payload: Value,
    ) -> Result<TxReceipt, ClientError> {
        let mut url = self.endpoint(GAME_TX_PREFIX)?;
        url.path_segments_mut()
            .map_err(|()| ClientError::UrlParse {
                context: "Base URL cannot carry a path",
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .push(name);
        let url = self.with_namespace_param(url);
        let request = GameTransactionRequest {
            persona_tag: persona_tag.to_owned(),
            body: payload,
        };
        send_json(self.signed_post(url, &request), "POST /tx/game").await
    }

    fn endpoint(&self, path: &'static str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::UrlParse {
                context: path,
                source,
            })
    }

    fn tx_url(&self, path: &'static str) -> Result<Url, ClientError> {
        self.endpoint(path).map(|url| self.with_namespace_param(url))
    }

    fn with_namespace_param(&self, mut url: Url) -> Url {
        if let Some(namespace) = &self.query_namespace {
            url.query_pairs_mut().append_pair(NAMESPACE_PARAM, namespace);
        }
        url
    }

    fn signed_post<T: Serialize + ?Sized>(&self, url: Url, payload: &T) -> rqm::RequestBuilder {
        let request = self.http.post(url).json(payload);
        match &self.signing_key {
            Some(key) => request.with_extension(key.clone()),
            None => request,
        }
    }
}

async fn send_json<R: DeserializeOwned>(
    request: rqm::RequestBuilder,
    context: &'static str,
) -> Result<R, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|source| ClientError::Request { context, source })?;

    let status = response.status();
    if status.is_success() {
        response
            .json::<R>()
            .await
            .map_err(|source| ClientError::JsonDeserialization { context, source })
    } else {
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::ResponseBodyRead { context, source })?;
        Err(ClientError::HttpStatus {
            context,
            status,
            body,
        })
    }
}
