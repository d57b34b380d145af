//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum::serve)
//!     → server.rs (middleware: request ID, trace, deadline, body limit)
//!     → request.rs (buffer body, strip hop-by-hop headers, X-Forwarded-For)
//!     → routing::router (select peer, retry, fail over)
//!     → backend response or 503 sent to client
//! ```

pub mod request;
pub mod server;

pub use request::{ProxyRequest, X_REQUEST_ID};
pub use server::HttpServer;
