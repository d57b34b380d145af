//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the load
//! balancer. All types derive Serde traits so a config can be built in code,
//! logged, or embedded by a caller; every field has a default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Backend target addresses, in pool order (e.g., "http://localhost:8081").
    pub backends: BackendList,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Retry and failover settings.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ordered list of backend target addresses.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct BackendList(pub Vec<String>);

impl Default for BackendList {
    fn default() -> Self {
        Self(vec![
            "http://localhost:8081".to_string(),
            "http://localhost:8082".to_string(),
            "http://localhost:8083".to_string(),
        ])
    }
}

impl BackendList {
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for BackendList {
    fn from(targets: Vec<String>) -> Self {
        Self(targets)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Largest request body buffered for replay on retry/failover.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the periodic health checker.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// TCP connect timeout per probe in seconds.
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 20,
            timeout_secs: 2,
        }
    }
}

/// Longest accepted health check interval (one day).
pub const MAX_HEALTH_INTERVAL_SECS: u64 = 86_400;

impl HealthCheckConfig {
    /// Tick interval, clamped to `MAX_HEALTH_INTERVAL_SECS`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.min(MAX_HEALTH_INTERVAL_SECS))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry configuration for a single peer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries against the same peer before it is marked dead.
    pub max_retries: u32,

    /// Flat delay between retries in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_ms: 10,
        }
    }
}

/// Timeout configuration for various operations.
///
/// `request_secs` must outlast one backend's full retry cycle so a hung
/// backend is demoted by the request that finds it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a whole inbound request, retries included.
    pub request_secs: u64,

    /// Deadline for one forward attempt to a backend.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 5,
        }
    }
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn upstream(&self) -> Duration {
        Duration::from_secs(self.upstream_secs)
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Worst case spent on one backend: every attempt times out.
    pub fn peer_budget(&self, upstream: Duration) -> Duration {
        upstream
            .saturating_mul(self.max_retries.saturating_add(1))
            .saturating_add(self.backoff().saturating_mul(self.max_retries))
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.backends.len(), 3);
        assert_eq!(config.backends.0[0], "http://localhost:8081");
        assert_eq!(config.backends.0[2], "http://localhost:8083");
        assert_eq!(config.health_check.interval(), Duration::from_secs(20));
        assert_eq!(config.health_check.timeout(), Duration::from_secs(2));
        assert_eq!(config.retries.max_retries, 3);
        assert_eq!(config.retries.backoff_ms, 10);
        assert_eq!(config.timeouts.request(), Duration::from_secs(30));
        assert_eq!(config.timeouts.upstream(), Duration::from_secs(5));
    }

    #[test]
    fn peer_budget_covers_every_attempt_and_backoff() {
        let retries = RetryConfig::default();
        assert_eq!(
            retries.peer_budget(Duration::from_secs(5)),
            Duration::from_millis(20_030)
        );

        let huge = RetryConfig { max_retries: u32::MAX, backoff_ms: u64::MAX };
        assert_eq!(huge.peer_budget(Duration::from_secs(u64::MAX)), Duration::MAX);
    }

    #[test]
    fn health_interval_is_clamped() {
        let config = HealthCheckConfig { interval_secs: u64::MAX, ..Default::default() };
        assert_eq!(config.interval(), Duration::from_secs(MAX_HEALTH_INTERVAL_SECS));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let json = r#"{ "backends": ["http://10.0.0.1:9000"], "retries": { "max_retries": 1 } }"#;
        let config: ProxyConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.backends.0, vec!["http://10.0.0.1:9000".to_string()]);
        assert_eq!(config.retries.max_retries, 1);
        assert_eq!(config.retries.backoff_ms, 10);
        assert!(config.health_check.enabled);
    }
}
