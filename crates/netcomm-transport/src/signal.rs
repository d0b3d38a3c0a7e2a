//! Shutdown and connection status signals shared by the workers.

use std::sync::Arc;

use tokio::sync::watch;

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

/// Creates a connected shutdown trigger/signal pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), ShutdownSignal(rx))
}

/// The owning side of a shutdown signal. Firing it is idempotent.
#[derive(Debug)]
pub struct ShutdownTrigger(watch::Sender<bool>);

impl ShutdownTrigger {
    /// Asks every worker holding a matching [`ShutdownSignal`] to stop.
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }

    /// Returns another signal bound to this trigger.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal(self.0.subscribe())
    }
}

/// The observing side of a shutdown request.
///
/// Workers race [`triggered`](Self::triggered) against each of their
/// blocking waits, so a shutdown request is seen wherever the worker
/// happens to be parked.
#[derive(Debug, Clone)]
pub struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownSignal {
    /// Returns `true` once shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Completes when shutdown is requested or the trigger is dropped.
    pub async fn triggered(&mut self) {
        // A dropped trigger can never fire, which means nobody owns the
        // connection any more: treat it as a shutdown request too.
        let _ = self.0.wait_for(|&stop| stop).await;
    }
}

// ---------------------------------------------------------------------------
// ConnectionStatus
// ---------------------------------------------------------------------------

/// What collaborators can observe about a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No connection, or it was closed on request.
    Disconnected,
    /// Workers are running.
    Connected,
    /// A worker failed; the string says why.
    Lost(String),
}

/// Shared writer for the connection status.
#[derive(Debug, Clone)]
pub struct StatusHandle(Arc<watch::Sender<ConnectionStatus>>);

impl StatusHandle {
    pub fn new() -> Self {
        Self(Arc::new(watch::channel(ConnectionStatus::Disconnected).0))
    }

    /// Current status.
    pub fn get(&self) -> ConnectionStatus {
        self.0.borrow().clone()
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.0.subscribe()
    }

    pub fn set_connected(&self) {
        self.0.send_replace(ConnectionStatus::Connected);
    }

    pub fn set_disconnected(&self) {
        self.0.send_replace(ConnectionStatus::Disconnected);
    }

    /// Marks a live connection as lost.
    ///
    /// Only the first failure is recorded: once the receiver has died the
    /// sender usually fails too, and the first reason is the useful one.
    pub fn mark_lost(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.0.send_if_modified(|status| {
            if *status == ConnectionStatus::Connected {
                *status = ConnectionStatus::Lost(reason);
                true
            } else {
                false
            }
        });
    }
}

impl Default for StatusHandle {
    fn default() -> Self {
        Self::new()
    }
}
