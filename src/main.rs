//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │               LOAD BALANCER                  │
//!                        │                                              │
//!     Client Request     │  ┌─────────┐    ┌──────────┐    ┌─────────┐  │
//!     ───────────────────┼─▶│  http   │───▶│ routing  │───▶│  pool   │  │
//!                        │  │ server  │    │  router  │    │ (rr)    │  │
//!                        │  └─────────┘    └────┬─────┘    └────┬────┘  │
//!                        │                      │ retry/        │       │
//!                        │                      │ failover      ▼       │
//!     Client Response    │                      │          ┌─────────┐  │
//!     ◀──────────────────┼──────────────────────┴──────────│ backend │◀─┼──── Backend
//!                        │                                 └────▲────┘  │     Servers
//!                        │                                      │       │
//!                        │                          ┌───────────┴────┐  │
//!                        │                          │ health checker │  │
//!                        │                          │ (TCP, 20s)     │  │
//!                        │                          └────────────────┘  │
//!                        └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use roundrobin_proxy::config::{BackendList, ProxyConfig};
use roundrobin_proxy::lifecycle::{Shutdown, StartupError};
use roundrobin_proxy::observability::logging;
use roundrobin_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "roundrobin-proxy")]
#[command(about = "Round-robin HTTP load balancer with health checks and failover", long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: String,

    /// Backend URL; repeat for each backend (replaces the default list).
    #[arg(short, long = "backend", value_name = "URL")]
    backends: Vec<String>,

    /// Seconds between health checks.
    #[arg(long, default_value_t = 20)]
    health_interval: u64,

    /// TCP connect timeout for health probes, in seconds.
    #[arg(long, default_value_t = 2)]
    health_timeout: u64,

    /// Disable the periodic health checker.
    #[arg(long)]
    no_health_check: bool,

    /// Retries against one backend before failing over.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Delay between retries, in milliseconds.
    #[arg(long, default_value_t = 10)]
    retry_backoff_ms: u64,

    /// Deadline for a whole inbound request, in seconds.
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// Deadline for one forward attempt, in seconds.
    #[arg(long, default_value_t = 5)]
    upstream_timeout: u64,

    /// Log level when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = self.bind;
        if !self.backends.is_empty() {
            config.backends = BackendList(self.backends);
        }
        config.health_check.enabled = !self.no_health_check;
        config.health_check.interval_secs = self.health_interval;
        config.health_check.timeout_secs = self.health_timeout;
        config.retries.max_retries = self.max_retries;
        config.retries.backoff_ms = self.retry_backoff_ms;
        config.timeouts.request_secs = self.request_timeout;
        config.timeouts.upstream_secs = self.upstream_timeout;
        config.observability.log_level = self.log_level;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Cli::parse().into_config();
    logging::init(&config.observability);

    tracing::info!("roundrobin-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let server = HttpServer::new(config.clone()).inspect_err(|e| {
        tracing::error!(error = %e, "Refusing to start");
    })?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
