//! Retry logic.
//!
//! # Responsibilities
//! - Bound the retries against a single peer
//! - Wait a flat delay between retries
//!
//! # Design Decisions
//! - Only transport failures are retried; any backend response is final
//! - Flat delay, not exponential: the bound is small and failover follows
//! - The delay is a plain async sleep, so dropping the request cancels it

use std::time::Duration;

use crate::config::RetryConfig;

/// Per-peer retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries against the same peer before failing over.
    pub max_retries: u32,
    /// Delay before each retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: config.backoff(),
        }
    }

    /// Whether another retry against the current peer is allowed.
    pub fn should_retry(&self, retries: u32) -> bool {
        retries < self.max_retries
    }

    /// Sleep for the backoff delay.
    pub async fn wait(&self) {
        tokio::time::sleep(self.backoff).await;
    }
}
