//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Buffered inbound request (http::request::ProxyRequest)
//!     → router.rs (select peer, forward, retry, fail over)
//!     → Return: backend response verbatim, or 503
//! ```
//!
//! # Design Decisions
//! - Every path and method goes through the same router
//! - Retry/attempt counters live in a per-request value, not on the pool
//! - Within one request, attempts are strictly sequential

pub mod router;

pub use router::{RequestRouter, RouteOutcome, RoutingState, SERVICE_UNAVAILABLE_BODY};
