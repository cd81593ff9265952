// Worker Shutdown Signal
// Shared, set-at-most-once, never cleared

use tokio::sync::watch;

/// Shutdown signal observed by the phase handlers.
///
/// The flag only ever moves from false to true; once a handler sees it
/// set, the cycle halts and the worker parks in its current phase.
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until shutdown is requested.
    ///
    /// Completes immediately if the signal is already set, and also if
    /// the sender is dropped (treated as shutdown so waiters cannot hang
    /// forever).
    pub async fn wait(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Shutdown sender, held by the host lifecycle
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Signal shutdown to the worker
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}
