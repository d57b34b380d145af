//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum catch-all router
//! - Wire up middleware (request ID, tracing, body limit, request deadline)
//! - Buffer each request and hand it to the request router
//! - Spawn the health checker alongside the listener
//! - Drain gracefully on shutdown

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::health::HealthChecker;
use crate::http::request::{MakeRequestUuidV4, ProxyRequest};
use crate::lifecycle::startup::{initialize_pool, StartupError};
use crate::load_balancer::pool::BackendPool;
use crate::resilience::retries::RetryPolicy;
use crate::routing::RequestRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<RequestRouter>,
}

/// HTTP front end of the load balancer.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    pool: Arc<BackendPool>,
}

impl HttpServer {
    /// Validate the config and build the server with HTTP forwarders.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let pool = Arc::new(initialize_pool(&config)?);
        Ok(Self::with_pool(config, pool))
    }

    /// Build the server around an already constructed pool.
    pub fn with_pool(config: ProxyConfig, pool: Arc<BackendPool>) -> Self {
        let request_router = Arc::new(RequestRouter::new(
            pool.clone(),
            RetryPolicy::from_config(&config.retries),
        ));
        let state = AppState {
            router: request_router,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            pool,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The body limit sits outside the deadline: `Timeout` needs a response
    /// body with a `Default`, which the limit's body wrapper lacks.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                config.timeouts.request(),
            ));

        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server until the shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), StartupError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.pool.len(),
            "Load balancer started"
        );

        if self.config.health_check.enabled {
            let checker = HealthChecker::new(self.pool.clone(), &self.config.health_check);
            tokio::spawn(checker.run(shutdown.resubscribe()));
        } else {
            tracing::info!("Active health checks disabled");
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }
}

/// Catch-all handler: buffer, route, answer.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let (parts, body) = request.into_parts();

    // RequestBodyLimitLayer has already bounded the body.
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(remote_addr = %remote_addr, error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    let request = ProxyRequest::new(parts, body, remote_addr);
    tracing::debug!(
        request_id = %request.request_id(),
        method = %request.method(),
        path = %request.path(),
        remote_addr = %remote_addr,
        "Proxying request"
    );

    let (outcome, routing) = state.router.route(&request).await;
    if routing.attempts > 0 {
        tracing::info!(
            request_id = %request.request_id(),
            attempts = routing.attempts,
            failed_over = ?routing.failed_over,
            "Request needed failover"
        );
    }
    outcome.into_response()
}
