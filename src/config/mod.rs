//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs) + command-line overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to startup, which builds the backend pool
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the backend list never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod schema;
pub mod validation;

pub use schema::ProxyConfig;
pub use schema::{
    BackendList, HealthCheckConfig, ListenerConfig, ObservabilityConfig, RetryConfig,
    TimeoutConfig, MAX_HEALTH_INTERVAL_SECS,
};
pub use validation::{validate_config, ValidationError};
