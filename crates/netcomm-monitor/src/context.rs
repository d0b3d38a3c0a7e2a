//! The state monitor replies execute against.

use std::sync::Arc;

use netcomm_session::LoginMonitor;
use tokio::sync::broadcast;

use crate::MonitorEvent;

/// Everything a monitor reply may touch.
///
/// Replies never block: events go out on a broadcast channel, and a
/// subscriber that falls behind loses the oldest events rather than
/// stalling the executor.
#[derive(Debug, Clone)]
pub struct MonitorContext {
    events: broadcast::Sender<MonitorEvent>,
    login: Arc<LoginMonitor>,
}

impl MonitorContext {
    /// Creates a context whose event channel buffers up to `capacity`
    /// events per subscriber.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<MonitorEvent>) {
        let (events, rx) = broadcast::channel(capacity.max(1));
        let ctx = Self {
            events,
            login: Arc::new(LoginMonitor::new()),
        };
        (ctx, rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub fn login(&self) -> &LoginMonitor {
        &self.login
    }

    /// Publishes `event` to every subscriber.
    pub fn publish(&self, event: MonitorEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("no event subscribers");
        }
    }
}
