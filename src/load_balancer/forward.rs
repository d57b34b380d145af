//! Upstream forwarding capability.
//!
//! # Responsibilities
//! - Send one prepared request to one backend and return its response
//! - Turn connect/reset/timeout failures into `TransportError`
//!
//! # Design Decisions
//! - No retry logic here; the router owns retry and failover policy
//! - Backend responses of any status are successes at this layer
//! - Path and query are preserved; only scheme and authority are rewritten

use axum::body::Body;
use axum::http::uri::{InvalidUriParts, PathAndQuery, Scheme, Uri};
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use thiserror::Error;
use tokio::time;
use url::Url;

/// Failure to get any response out of a backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, reset, or protocol failure.
    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    /// No response within the upstream deadline.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// The request URI could not be rebased onto the backend.
    #[error("invalid upstream uri: {0}")]
    InvalidUri(#[from] InvalidUriParts),
}

/// Something that can carry a request to a single upstream server.
pub trait Forwarder: Send + Sync + std::fmt::Debug {
    fn forward(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, TransportError>>;
}

/// Shared HTTP/1 client used by every `HttpForwarder`.
pub type UpstreamClient = Client<HttpConnector, Body>;

/// Build the pooled upstream client.
pub fn upstream_client() -> UpstreamClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Plain-HTTP reverse proxying to one `scheme://host:port`.
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    target: Url,
    client: UpstreamClient,
    timeout: Duration,
}

impl HttpForwarder {
    pub fn new(target: Url, client: UpstreamClient, timeout: Duration) -> Self {
        Self {
            target,
            client,
            timeout,
        }
    }

    /// Rebase an inbound URI onto this backend, keeping path and query.
    pub fn target_uri(&self, inbound: &Uri) -> Result<Uri, InvalidUriParts> {
        let base = self.target.path().trim_end_matches('/');
        let path_and_query = inbound
            .path_and_query()
            .map(PathAndQuery::as_str)
            .unwrap_or("/");

        let mut parts = inbound.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = authority_of(&self.target).parse().ok();
        parts.path_and_query = format!("{}{}", base, path_and_query).parse().ok();
        Uri::from_parts(parts)
    }
}

impl Forwarder for HttpForwarder {
    fn forward(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, TransportError>> {
        Box::pin(async move {
            let (mut parts, body) = request.into_parts();
            parts.uri = self.target_uri(&parts.uri)?;
            let request = Request::from_parts(parts, body);

            match time::timeout(self.timeout, self.client.request(request)).await {
                Ok(Ok(response)) => Ok(response.map(Body::new)),
                Ok(Err(e)) => Err(TransportError::Request(e)),
                Err(_) => Err(TransportError::Timeout(self.timeout)),
            }
        })
    }
}

/// `host:port` of a backend URL, with the scheme's default port filled in.
pub fn authority_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port_or_known_default() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
