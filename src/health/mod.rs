//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe each backend in pool order (probe.rs, TCP connect)
//!     → Backend::set_alive
//!
//! Passive demotion (routing::router):
//!     Forwarding keeps failing after retries
//!     → BackendPool::mark_backend_status(addr, false)
//! ```
//!
//! # Design Decisions
//! - A probe failure is never fatal; it only flips liveness
//! - Probes run sequentially within a tick
//! - The checker never adds or removes backends

pub mod active;
pub mod probe;

pub use active::HealthChecker;
pub use probe::ProbeError;
