//! reqwest middleware that runs outgoing requests through interceptors.
//!
//! [`InterceptorPipeline`] applies its interceptors in registration order and
//! sends whatever the last one returns. An interceptor error aborts the
//! request; it surfaces as [`reqwest_middleware::Error::Middleware`] wrapping
//! the [`InterceptError`].

use std::sync::Arc;

use http::Extensions;
use reqwest::{Client, ClientBuilder, Request, Response};
use reqwest_middleware as rqm;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::error::InterceptError;
use crate::interceptor::{RequestInterceptor, SignerInterceptor};
use crate::namespace::NamespaceResolver;

/// An ordered list of [`RequestInterceptor`]s, usable as reqwest middleware.
#[derive(Clone)]
#[allow(missing_debug_implementations)] // dyn trait objects do not implement Debug
pub struct InterceptorPipeline {
    interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
}

impl Default for InterceptorPipeline {
    fn default() -> Self {
        Self {
            interceptors: Arc::from([]),
        }
    }
}

impl InterceptorPipeline {
    /// Creates an empty pipeline. Requests pass through unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pipeline holding a single [`SignerInterceptor`] backed by
    /// `resolver`.
    #[must_use]
    pub fn signing(resolver: Arc<NamespaceResolver>) -> Self {
        Self::new().with(SignerInterceptor::new(resolver))
    }

    /// Appends an interceptor. Interceptors run in the order they are added.
    #[must_use]
    pub fn with(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        let mut interceptors = (*self.interceptors).to_vec();
        interceptors.push(Arc::new(interceptor));
        self.interceptors = Arc::from(interceptors);
        self
    }

    /// Number of registered interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether the pipeline has no interceptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Runs `request` through every interceptor.
    ///
    /// # Errors
    ///
    /// Returns the first [`InterceptError`]; later interceptors do not run.
    pub async fn apply(
        &self,
        mut request: Request,
        extensions: &Extensions,
    ) -> Result<Request, InterceptError> {
        for interceptor in self.interceptors.iter() {
            request = interceptor.intercept(request, extensions).await?;
        }
        Ok(request)
    }
}

#[cfg_attr(
    feature = "telemetry",
    instrument(name = "cardinal.reqwest.next", skip_all)
)]
async fn run_next(
    next: rqm::Next<'_>,
    req: Request,
    extensions: &mut Extensions,
) -> rqm::Result<Response> {
    next.run(req, extensions).await
}

#[async_trait::async_trait]
impl rqm::Middleware for InterceptorPipeline {
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardinal.reqwest.handle", skip_all, err)
    )]
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: rqm::Next<'_>,
    ) -> rqm::Result<Response> {
        let req = self
            .apply(req, extensions)
            .await
            .map_err(|e| rqm::Error::Middleware(e.into()))?;
        run_next(next, req, extensions).await
    }
}

/// Adds request signing to reqwest clients.
///
/// Implemented on [`Client`] and [`ClientBuilder`].
pub trait ReqwestWithSigning<A> {
    /// Wraps the client or builder with `pipeline` as middleware.
    fn with_signing(self, pipeline: InterceptorPipeline) -> ReqwestWithSigningBuilder<A>;
}

impl ReqwestWithSigning<Self> for Client {
    fn with_signing(self, pipeline: InterceptorPipeline) -> ReqwestWithSigningBuilder<Self> {
        ReqwestWithSigningBuilder {
            inner: self,
            pipeline,
        }
    }
}

impl ReqwestWithSigning<Self> for ClientBuilder {
    fn with_signing(self, pipeline: InterceptorPipeline) -> ReqwestWithSigningBuilder<Self> {
        ReqwestWithSigningBuilder {
            inner: self,
            pipeline,
        }
    }
}

/// Builder for a reqwest client with an [`InterceptorPipeline`] installed.
#[allow(missing_debug_implementations)] // generic A may not implement Debug
pub struct ReqwestWithSigningBuilder<A> {
    inner: A,
    pipeline: InterceptorPipeline,
}

/// Builds the final client from a [`ReqwestWithSigningBuilder`].
pub trait ReqwestWithSigningBuild {
    /// The type returned by [`build`](Self::build)
    type BuildResult;
    /// The type returned by [`builder`](Self::builder)
    type BuilderResult;

    /// Builds the client, consuming the builder.
    fn build(self) -> Self::BuildResult;

    /// Returns the middleware client builder with the pipeline added, so more
    /// middleware can be layered on.
    fn builder(self) -> Self::BuilderResult;
}

impl ReqwestWithSigningBuild for ReqwestWithSigningBuilder<Client> {
    type BuildResult = rqm::ClientWithMiddleware;
    type BuilderResult = rqm::ClientBuilder;

    fn build(self) -> Self::BuildResult {
        self.builder().build()
    }

    fn builder(self) -> Self::BuilderResult {
        rqm::ClientBuilder::new(self.inner).with(self.pipeline)
    }
}

impl ReqwestWithSigningBuild for ReqwestWithSigningBuilder<ClientBuilder> {
    type BuildResult = Result<rqm::ClientWithMiddleware, reqwest::Error>;
    type BuilderResult = Result<rqm::ClientBuilder, reqwest::Error>;

    fn build(self) -> Self::BuildResult {
        let builder = self.builder()?;
        Ok(builder.build())
    }

    fn builder(self) -> Self::BuilderResult {
        let client = self.inner.build()?;
        Ok(rqm::ClientBuilder::new(client).with(self.pipeline))
    }
}
