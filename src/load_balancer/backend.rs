//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track liveness (alive/dead) for peer selection
//! - Carry the forwarding capability used by the router

use axum::body::Body;
use axum::http::{Request, Response};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

use crate::load_balancer::forward::{Forwarder, TransportError};

/// A single backend server.
///
/// A dead backend stays in the pool; it is only skipped by selection.
#[derive(Debug)]
pub struct Backend {
    /// Target address, fixed at construction.
    address: Url,
    /// Liveness flag shared by the health checker and the router.
    alive: AtomicBool,
    /// How requests reach this backend.
    forwarder: Arc<dyn Forwarder>,
}

impl Backend {
    /// Create a new backend. Backends start alive.
    pub fn new(address: Url, forwarder: Arc<dyn Forwarder>) -> Self {
        Self {
            address,
            alive: AtomicBool::new(true),
            forwarder,
        }
    }

    pub fn address(&self) -> &Url {
        &self.address
    }

    /// Current liveness.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Set liveness, returning the previous value.
    pub fn set_alive(&self, alive: bool) -> bool {
        self.alive.swap(alive, Ordering::AcqRel)
    }

    /// Send a request to this backend.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        self.forwarder.forward(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::BoxFuture;

    #[derive(Debug)]
    struct Echo;

    impl Forwarder for Echo {
        fn forward(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, TransportError>> {
            let path = request.uri().path().to_string();
            Box::pin(async move { Ok(Response::new(Body::from(path))) })
        }
    }

    fn backend() -> Backend {
        Backend::new(Url::parse("http://127.0.0.1:8081").unwrap(), Arc::new(Echo))
    }

    #[test]
    fn test_backend_starts_alive() {
        assert!(backend().is_alive());
    }

    #[test]
    fn test_set_alive_reports_previous_state() {
        let b = backend();
        assert!(b.set_alive(false));
        assert!(!b.is_alive());
        assert!(!b.set_alive(false));
        assert!(!b.set_alive(true));
        assert!(b.is_alive());
    }

    #[test]
    fn test_concurrent_liveness_updates() {
        let b = Arc::new(backend());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let b = b.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        b.set_alive(i % 2 == 0);
                        let _ = b.is_alive();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        b.set_alive(true);
        assert!(b.is_alive());
    }

    #[tokio::test]
    async fn test_forward_delegates_to_forwarder() {
        let b = backend();
        let request = Request::builder().uri("/hello").body(Body::empty()).unwrap();

        let response = b.forward(request).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"/hello");
    }
}
