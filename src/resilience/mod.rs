//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Forward to backend fails (TransportError):
//!     → retries.rs (retry same peer after flat backoff, up to max_retries)
//!     → exhausted: router marks the peer dead and fails over
//! ```
//!
//! # Design Decisions
//! - Every forward has a deadline (upstream timeout in forward.rs)
//! - Retries are per peer; failover is bounded by pool exhaustion

pub mod retries;

pub use retries::RetryPolicy;
