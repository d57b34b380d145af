//! Shutdown coordination.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::lifecycle::signals::wait_for_termination;

/// Coordinator for graceful shutdown.
///
/// The HTTP server and the health checker each hold a receiver and stop
/// when the signal is broadcast.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Broadcast the shutdown signal. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger shutdown on the first SIGINT/SIGTERM.
    pub fn trigger_on_signal(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let signal = wait_for_termination().await;
            tracing::info!(signal, "Shutdown signal received");
            this.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();

        shutdown.trigger();
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_subscribers() {
        Shutdown::new().trigger();
    }
}
