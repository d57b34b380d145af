//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe backends
//! - Update backend liveness based on results

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::probe::probe;
use crate::load_balancer::pool::BackendPool;

#[derive(Debug)]
pub struct HealthChecker {
    pool: Arc<BackendPool>,
    interval: Duration,
    timeout: Duration,
}

impl HealthChecker {
    /// The interval is clamped to `MAX_HEALTH_INTERVAL_SECS`, so the first
    /// deadline never overflows.
    pub fn new(pool: Arc<BackendPool>, config: &HealthCheckConfig) -> Self {
        Self {
            pool,
            interval: config.interval(),
            timeout: config.timeout(),
        }
    }

    /// Run until shutdown. The first tick fires one interval after start.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            timeout = ?self.timeout,
            backends = self.pool.len(),
            "Health checker starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::info!("Starting health check");
                    self.check_all().await;
                    tracing::info!(alive = self.pool.alive_count(), "Health check completed");
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health checker received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend in pool order and apply the results.
    pub async fn check_all(&self) {
        for backend in self.pool.backends() {
            let alive = match probe(backend.address(), self.timeout).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(backend = %backend.address(), error = %e, "Site unreachable");
                    false
                }
            };

            let was_alive = backend.set_alive(alive);
            let status = if alive { "up" } else { "down" };
            if was_alive != alive {
                tracing::warn!(backend = %backend.address(), status, "Backend status changed");
            } else {
                tracing::info!(backend = %backend.address(), status, "Backend status");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::backend::Backend;
    use crate::load_balancer::forward::{Forwarder, TransportError};
    use axum::body::Body;
    use axum::http::{Request, Response};
    use futures_util::future::BoxFuture;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use url::Url;

    #[derive(Debug)]
    struct Unused;

    impl Forwarder for Unused {
        fn forward(&self, _request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, TransportError>> {
            Box::pin(async { Ok(Response::new(Body::empty())) })
        }
    }

    fn pool_for(addrs: &[SocketAddr]) -> Arc<BackendPool> {
        let mut pool = BackendPool::new();
        for addr in addrs {
            let url = Url::parse(&format!("http://{}", addr)).unwrap();
            pool.add_backend(Backend::new(url, Arc::new(Unused)));
        }
        Arc::new(pool)
    }

    fn checker(pool: Arc<BackendPool>) -> HealthChecker {
        let config = HealthCheckConfig {
            enabled: true,
            interval_secs: 1,
            timeout_secs: 1,
        };
        HealthChecker::new(pool, &config)
    }

    async fn closed_port() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    #[tokio::test]
    async fn test_check_marks_unreachable_dead() {
        let up = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let down = closed_port().await;
        let pool = pool_for(&[up.local_addr().unwrap(), down]);

        checker(pool.clone()).check_all().await;

        assert!(pool.backends()[0].is_alive());
        assert!(!pool.backends()[1].is_alive());
        assert_eq!(pool.get_next_peer().unwrap().address(), pool.backends()[0].address());
    }

    #[tokio::test]
    async fn test_check_flips_back_when_reachable() {
        let addr = closed_port().await;
        let pool = pool_for(&[addr]);
        let checker = checker(pool.clone());

        checker.check_all().await;
        assert!(!pool.backends()[0].is_alive());
        assert!(pool.get_next_peer().is_none());

        let _listener = TcpListener::bind(addr).await.unwrap();
        checker.check_all().await;
        assert!(pool.backends()[0].is_alive());
        assert!(pool.get_next_peer().is_some());
    }

    #[tokio::test]
    async fn test_run_exits_on_shutdown() {
        let pool = pool_for(&[closed_port().await]);
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(checker(pool).run(rx));
        tx.send(()).unwrap();

        time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("checker did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_huge_interval_runs_until_shutdown() {
        let pool = pool_for(&[closed_port().await]);
        let config = HealthCheckConfig {
            enabled: true,
            interval_secs: u64::MAX,
            timeout_secs: 1,
        };
        let checker = HealthChecker::new(pool, &config);
        assert!(format!("{:?}", checker).contains("HealthChecker"));

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(checker.run(rx));
        tokio::task::yield_now().await;
        tx.send(()).unwrap();

        time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("checker did not stop")
            .expect("checker panicked");
    }
}
