//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Build backend pool → (http::server) bind, spawn health checker, serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server drains, health checker exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then pool, then listener
//! - Misconfiguration never produces a running process with zero backends

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{initialize_pool, StartupError};
