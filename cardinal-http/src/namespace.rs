//! Lazy, single-flight resolution of the world namespace.
//!
//! Every signed message is bound to the namespace of the world it targets.
//! The namespace is served by `GET /world` and does not change for the
//! lifetime of a deployment, so a [`NamespaceResolver`] fetches it once and
//! keeps it.
//!
//! Requests issued before the first fetch completes share that fetch: the
//! first caller stores a pending shared future, later callers await the same
//! future instead of starting their own. A failed fetch is handed to every
//! waiter and then forgotten, so the next request retries from scratch.

use std::fmt;
use std::sync::Arc;

use cardinal::proto::{WORLD_PATH, WorldInfo};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use tokio::sync::Mutex;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

use crate::error::NamespaceError;

const CONTEXT: &str = "GET /world";

type SharedFetch = Shared<BoxFuture<'static, Result<String, Arc<NamespaceError>>>>;

enum State {
    Empty,
    Pending(SharedFetch),
    Ready(String),
}

/// Fetches and caches the namespace of one Cardinal world.
///
/// One resolver belongs to one client. The first origin it resolves wins;
/// a client talks to a single world.
pub struct NamespaceResolver {
    client: Client,
    state: Mutex<State>,
}

impl fmt::Debug for NamespaceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state.try_lock().as_deref() {
            Ok(State::Empty) => "empty",
            Ok(State::Pending(_)) => "pending",
            Ok(State::Ready(_)) => "ready",
            Err(_) => "locked",
        };
        f.debug_struct("NamespaceResolver")
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

impl Default for NamespaceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceResolver {
    /// Creates a resolver with its own HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Creates a resolver that fetches with `client`.
    ///
    /// Pass the plain client, not one wrapped in signing middleware.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            state: Mutex::new(State::Empty),
        }
    }

    /// Returns the namespace if it has already been resolved.
    pub async fn cached(&self) -> Option<String> {
        match &*self.state.lock().await {
            State::Ready(namespace) => Some(namespace.clone()),
            State::Empty | State::Pending(_) => None,
        }
    }

    /// Forgets a resolved namespace. An in-flight fetch is left running.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, State::Ready(_)) {
            *state = State::Empty;
        }
    }

    /// Returns the namespace of the world served at `origin`.
    ///
    /// Only the scheme, host and port of `origin` are used; the path and query
    /// are ignored, so the URL of the request being signed can be passed
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceError`] if the world endpoint cannot be reached,
    /// answers with a non-success status, or does not return a namespace.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardinal.namespace.resolve", skip_all, err)
    )]
    pub async fn resolve(&self, origin: &Url) -> Result<String, Arc<NamespaceError>> {
        let pending = {
            let mut state = self.state.lock().await;
            match &*state {
                State::Ready(namespace) => return Ok(namespace.clone()),
                State::Pending(pending) => pending.clone(),
                State::Empty => {
                    let url = world_url(origin).map_err(Arc::new)?;
                    #[cfg(feature = "telemetry")]
                    debug!(url = %url, "Namespace not cached, fetching world info");
                    let pending = fetch_namespace(self.client.clone(), url)
                        .map(|result| result.map_err(Arc::new))
                        .boxed()
                        .shared();
                    *state = State::Pending(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut state = self.state.lock().await;
        let still_pending = matches!(&*state, State::Pending(current) if current.ptr_eq(&pending));
        if still_pending {
            *state = match &outcome {
                Ok(namespace) => State::Ready(namespace.clone()),
                Err(_) => State::Empty,
            };
        }
        outcome
    }
}

fn world_url(origin: &Url) -> Result<Url, NamespaceError> {
    let base = origin.origin().ascii_serialization();
    Url::parse(&base)
        .and_then(|base| base.join(WORLD_PATH))
        .map_err(|source| NamespaceError::UrlParse {
            context: "Failed to construct /world URL",
            source,
        })
}

async fn fetch_namespace(client: Client, url: Url) -> Result<String, NamespaceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| NamespaceError::Http {
            context: CONTEXT,
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .map_err(|source| NamespaceError::ResponseBodyRead {
                context: CONTEXT,
                source,
            })?;
        return Err(NamespaceError::HttpStatus {
            context: CONTEXT,
            status,
            body,
        });
    }

    let info: WorldInfo =
        response
            .json()
            .await
            .map_err(|source| NamespaceError::JsonDeserialization {
                context: CONTEXT,
                source,
            })?;
    Ok(info.namespace)
}
