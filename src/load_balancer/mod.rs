//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Router asks for a peer
//!     → pool.rs (get_next_peer)
//!         → round_robin.rs (draw the starting index)
//!         → scan forward, skipping dead backends
//!     → backend.rs (liveness + forward)
//!         → forward.rs (HTTP transport to the upstream)
//!     → Return response or TransportError
//! ```
//!
//! # Design Decisions
//! - Backend list is fixed at startup; dead backends stay in the pool
//! - Liveness is one atomic flag per backend, shared with the health checker
//! - Selection never loops: at most one full pass over the pool
//! - Forwarding is behind a trait so the router can be exercised without sockets

pub mod backend;
pub mod forward;
pub mod pool;
pub mod round_robin;

pub use backend::Backend;
pub use forward::{Forwarder, HttpForwarder, TransportError};
pub use pool::BackendPool;
