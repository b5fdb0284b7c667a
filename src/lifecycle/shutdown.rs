//! Graceful shutdown fan-out.
//!
//! One trigger (termination signal or a test) reaches the HTTP server, the
//! SIGHUP reload task, and every other holder of a receiver.

use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver that completes once [`trigger`](Self::trigger) is called.
    /// Subscribe before triggering; a late receiver never fires.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify every receiver. Returns `false` when no task was listening.
    pub fn trigger(&self) -> bool {
        let delivered = self.tx.send(()).is_ok();
        tracing::debug!(delivered, "Shutdown triggered");
        delivered
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
