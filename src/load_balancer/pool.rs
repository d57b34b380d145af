//! Backend pool management.
//!
//! # Responsibilities
//! - Own the fixed, ordered list of backends
//! - Pick the next alive peer in round-robin order
//! - Mark backends alive/dead by address

use std::sync::Arc;
use url::Url;

use crate::load_balancer::{backend::Backend, round_robin::RoundRobin};

/// Ordered set of backends plus the shared round-robin cursor.
///
/// Built once at startup, then shared via `Arc` between the router and the
/// health checker. The backend list is never resized after construction.
#[derive(Debug, Default)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    cursor: RoundRobin,
}

impl BackendPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend. Build-time only.
    pub fn add_backend(&mut self, backend: Backend) {
        self.backends.push(Arc::new(backend));
    }

    /// Advance the shared cursor and return its position in the pool.
    pub fn next_index(&self) -> usize {
        self.cursor.next_index(self.backends.len())
    }

    /// Select the next alive backend, or `None` if every backend is dead.
    ///
    /// Scans at most `len` positions starting at `next_index()`. When the
    /// scan has to skip dead backends, the cursor is moved to the landing
    /// position so the next caller starts past them.
    pub fn get_next_peer(&self) -> Option<Arc<Backend>> {
        let len = self.backends.len();
        if len == 0 {
            return None;
        }

        let next = self.next_index();
        for i in next..next + len {
            let idx = i % len;
            let backend = &self.backends[idx];
            if backend.is_alive() {
                if i != next {
                    self.cursor.advance_to(idx);
                }
                return Some(backend.clone());
            }
        }

        tracing::debug!(backend_count = len, "No alive backends in pool");
        None
    }

    /// Set liveness of the backend with the given address.
    ///
    /// Returns false if no backend has that address.
    pub fn mark_backend_status(&self, address: &Url, alive: bool) -> bool {
        match self.backends.iter().find(|b| b.address() == address) {
            Some(backend) => {
                backend.set_alive(alive);
                true
            }
            None => {
                tracing::warn!(backend = %address, "Cannot mark unknown backend");
                false
            }
        }
    }

    /// All backends in pool order (for health checking).
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Number of backends currently alive.
    pub fn alive_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_alive()).count()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
