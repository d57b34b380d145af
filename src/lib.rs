//! Round-robin HTTP load balancer library.
//!
//! A fixed pool of backends, round-robin peer selection that skips dead
//! backends, per-request retry then failover, and a periodic TCP health check.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::BackendPool;
pub use routing::RequestRouter;
