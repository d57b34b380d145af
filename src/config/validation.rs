//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject configs the pool cannot run with (no backends, bad addresses)
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before any subsystem is initialized

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ProxyConfig, MAX_HEALTH_INTERVAL_SECS};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no backends configured")]
    NoBackends,

    #[error("backend `{address}` is not a valid URL: {reason}")]
    InvalidBackendUrl { address: String, reason: String },

    #[error("backend `{address}` has no host")]
    MissingHost { address: String },

    #[error("backend `{address}` uses unsupported scheme `{scheme}` (only http is supported)")]
    UnsupportedScheme { address: String, scheme: String },

    #[error("backend `{address}` is listed more than once")]
    DuplicateBackend { address: String },

    #[error("bind address `{address}` is not `host:port`")]
    InvalidBindAddress { address: String },

    #[error("`{field}` must be greater than zero")]
    Zero { field: &'static str },

    #[error("`{field}` must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("timeouts.request_secs ({request:?}) must exceed one backend's retry budget ({budget:?})")]
    RequestDeadlineTooShort { request: Duration, budget: Duration },
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    let mut seen = HashSet::new();
    for address in config.backends.iter() {
        match check_backend(address) {
            Ok(url) => {
                if !seen.insert(url) {
                    errors.push(ValidationError::DuplicateBackend {
                        address: address.clone(),
                    });
                }
            }
            Err(e) => errors.push(e),
        }
    }

    if !is_bind_address(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.listener.bind_address.clone(),
        });
    }

    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_body_bytes" });
    }
    if config.health_check.enabled {
        if config.health_check.interval_secs == 0 {
            errors.push(ValidationError::Zero { field: "health_check.interval_secs" });
        }
        if config.health_check.interval_secs > MAX_HEALTH_INTERVAL_SECS {
            errors.push(ValidationError::TooLarge {
                field: "health_check.interval_secs",
                max: MAX_HEALTH_INTERVAL_SECS,
            });
        }
        if config.health_check.timeout_secs == 0 {
            errors.push(ValidationError::Zero { field: "health_check.timeout_secs" });
        }
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.upstream_secs" });
    }

    // A deadline that fires mid-cycle would drop the request before the
    // failing backend is demoted.
    if config.timeouts.request_secs > 0 && config.timeouts.upstream_secs > 0 {
        let request = config.timeouts.request();
        let budget = config.retries.peer_budget(config.timeouts.upstream());
        if request <= budget {
            errors.push(ValidationError::RequestDeadlineTooShort { request, budget });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accept socket addresses and `hostname:port`, as the listener bind does.
fn is_bind_address(address: &str) -> bool {
    if address.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match address.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && !host.contains(|c: char| c.is_whitespace() || c == ':')
                && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

/// Parse one backend address into the URL the pool will use.
pub fn check_backend(address: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(address).map_err(|e| ValidationError::InvalidBackendUrl {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" {
        return Err(ValidationError::UnsupportedScheme {
            address: address.to_string(),
            scheme: url.scheme().to_string(),
        });
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::MissingHost {
            address: address.to_string(),
        });
    }

    Ok(url)
}
