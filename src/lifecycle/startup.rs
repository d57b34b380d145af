//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the backend pool from the configured targets
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The pool is built once and never resized

use std::sync::Arc;
use thiserror::Error;

use crate::config::validation::{check_backend, validate_config, ValidationError};
use crate::config::ProxyConfig;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::forward::{upstream_client, HttpForwarder};
use crate::load_balancer::pool::BackendPool;

/// Errors that stop the process from starting or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join(.0))]
    Config(Vec<ValidationError>),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate the config and build a pool with one HTTP forwarder per target.
pub fn initialize_pool(config: &ProxyConfig) -> Result<BackendPool, StartupError> {
    validate_config(config).map_err(StartupError::Config)?;

    let client = upstream_client();
    let upstream_timeout = config.timeouts.upstream();

    let mut pool = BackendPool::new();
    for target in config.backends.iter() {
        let url = check_backend(target).map_err(|e| StartupError::Config(vec![e]))?;
        let forwarder = HttpForwarder::new(url.clone(), client.clone(), upstream_timeout);
        pool.add_backend(Backend::new(url, Arc::new(forwarder)));
    }

    tracing::info!(
        backends = ?config.backends.0,
        "Backend pool initialized"
    );
    Ok(pool)
}
