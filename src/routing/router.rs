//! Per-request retry-then-failover control flow.
//!
//! # State Machine
//! ```text
//! Selecting ──none──▶ ServiceUnavailable (503)
//!     │
//!     ▼
//! Forwarding ──ok──▶ Response (verbatim)
//!     │ TransportError
//!     ├─ retries < max ─▶ backoff, retries += 1, Forwarding (same peer)
//!     └─ otherwise ─────▶ mark peer dead, attempts += 1, Selecting
//! ```
//!
//! Termination comes from pool exhaustion: every failover marks one more
//! backend dead, so `get_next_peer` eventually returns none. There is no
//! separate cap on `attempts`.

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use std::sync::Arc;
use url::Url;

use crate::http::request::ProxyRequest;
use crate::load_balancer::pool::BackendPool;
use crate::resilience::retries::RetryPolicy;

/// Body of the 503 answer when no backend can serve.
pub const SERVICE_UNAVAILABLE_BODY: &str = "Service not available";

/// Counters for one logical request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingState {
    /// Retries against the current peer.
    pub retries: u32,
    /// Distinct peers abandoned for this request.
    pub attempts: u32,
    /// Backends marked dead while handling this request, in order.
    pub failed_over: Vec<Url>,
}

/// Terminal state of a routed request.
pub enum RouteOutcome {
    /// A backend answered; its response is passed through unchanged.
    Forwarded { backend: Url, response: Response<Body> },
    /// No alive backend was left.
    ServiceUnavailable,
}

impl std::fmt::Debug for RouteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteOutcome::Forwarded { backend, response } => f
                .debug_struct("Forwarded")
                .field("backend", &backend.as_str())
                .field("status", &response.status())
                .finish(),
            RouteOutcome::ServiceUnavailable => f.write_str("ServiceUnavailable"),
        }
    }
}

impl IntoResponse for RouteOutcome {
    fn into_response(self) -> axum::response::Response {
        match self {
            RouteOutcome::Forwarded { response, .. } => response,
            RouteOutcome::ServiceUnavailable => {
                let mut response = Response::new(Body::from(SERVICE_UNAVAILABLE_BODY));
                *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                response
            }
        }
    }
}

/// Turns one inbound request into exactly one outbound response.
#[derive(Debug)]
pub struct RequestRouter {
    pool: Arc<BackendPool>,
    policy: RetryPolicy,
}

impl RequestRouter {
    pub fn new(pool: Arc<BackendPool>, policy: RetryPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    /// Route a request, returning the outcome and the final counters.
    ///
    /// Dropping the returned future cancels any in-flight forward or backoff.
    pub async fn route(&self, request: &ProxyRequest) -> (RouteOutcome, RoutingState) {
        let mut state = RoutingState::default();

        loop {
            // Selecting
            let Some(peer) = self.pool.get_next_peer() else {
                tracing::warn!(
                    request_id = %request.request_id(),
                    path = %request.path(),
                    attempts = state.attempts,
                    "No alive backend, answering 503"
                );
                return (RouteOutcome::ServiceUnavailable, state);
            };
            state.retries = 0;

            // Forwarding, with retries against the same peer
            loop {
                match peer.forward(request.to_request()).await {
                    Ok(response) => {
                        tracing::debug!(
                            request_id = %request.request_id(),
                            backend = %peer.address(),
                            status = %response.status(),
                            "Forwarded"
                        );
                        let backend = peer.address().clone();
                        return (RouteOutcome::Forwarded { backend, response }, state);
                    }
                    Err(e) => {
                        tracing::error!(backend = %peer.address(), error = %e, "Forwarding failed");
                        if !self.policy.should_retry(state.retries) {
                            break;
                        }
                        self.policy.wait().await;
                        state.retries += 1;
                    }
                }
            }

            // Failover
            self.pool.mark_backend_status(peer.address(), false);
            state.failed_over.push(peer.address().clone());
            state.attempts += 1;
            tracing::warn!(
                remote_addr = %request.remote_addr(),
                path = %request.path(),
                backend = %peer.address(),
                attempts = state.attempts,
                "Attempting retry on another backend"
            );
        }
    }
}
