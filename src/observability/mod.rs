//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (backend, request_id, attempts)
//!     → logging.rs (subscriber: env filter + fmt output)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the HTTP layer to the backend and back
//! - Health ticks, backend status, forwarding errors and failovers are always logged

pub mod logging;
