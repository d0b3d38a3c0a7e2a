//! `NetComm`: one client connection and its lifecycle.
//!
//! ```text
//! connect() ──→ [Connected] ──disconnect()──→ [Disconnected]
//!                   │                               ↑
//!            worker fails                      connect() again
//!                   ↓                               │
//!               [Lost(why)] ──disconnect()──────────┘
//! ```
//!
//! All methods take `&self` and `NetComm` is cheap to clone, so the same
//! handle can be given to the UI, the keep-alive task, and the replies
//! running on the executor.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use netcomm_protocol::{ClientCommand, ReplyRegistry};
use netcomm_session::{LoginMonitor, Teardown};
use netcomm_transport::{
    ConnectionStatus, CrashHandler, SharedCommand, StatusHandle, Workers,
};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::keepalive::KeepAlive;
use crate::{NetCommError, NetConfig};

/// Handle to one client connection.
#[derive(Clone)]
pub struct NetComm {
    inner: Arc<Inner>,
}

struct Inner {
    config: NetConfig,
    status: StatusHandle,
    /// `None` while disconnected.
    workers: Mutex<Option<Workers>>,
    keep_alive: Mutex<Option<JoinHandle<()>>>,
    crash_handler: Mutex<Option<CrashHandler>>,
}

impl NetComm {
    pub fn new(config: NetConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                status: StatusHandle::new(),
                workers: Mutex::new(None),
                keep_alive: Mutex::new(None),
                crash_handler: Mutex::new(None),
            }),
        }
    }

    /// Installs a handler called with the worker name and panic message
    /// whenever a worker or a reply panics. Applies from the next
    /// `connect`.
    pub fn with_crash_handler(self, handler: CrashHandler) -> Self {
        *lock(&self.inner.crash_handler) = Some(handler);
        self
    }

    pub fn config(&self) -> &NetConfig {
        &self.inner.config
    }

    /// Opens a TCP connection and starts the sender, receiver, and
    /// executor.
    ///
    /// Replies are decoded with `registry` and executed against `context`.
    ///
    /// # Errors
    /// [`NetCommError::AlreadyConnected`] if a connection is open,
    /// [`NetCommError::Connect`] if the socket cannot be opened. Nothing
    /// is started in either case.
    pub async fn connect<C>(
        &self,
        host: &str,
        port: u16,
        registry: Arc<ReplyRegistry<C>>,
        context: Arc<C>,
    ) -> Result<(), NetCommError>
    where
        C: Send + Sync + 'static,
    {
        self.reap_lost_connection();
        if lock(&self.inner.workers).is_some() {
            return Err(NetCommError::AlreadyConnected);
        }

        let connect_err = |source| NetCommError::Connect {
            host: host.to_string(),
            port,
            source,
        };
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(connect_err)?;
        stream.set_nodelay(true).map_err(connect_err)?;
        let (reader, writer) = stream.into_split();

        let mut slot = lock(&self.inner.workers);
        // Someone else connected while we were dialling.
        if slot.is_some() {
            return Err(NetCommError::AlreadyConnected);
        }

        self.inner.status.set_connected();
        let crash_handler = lock(&self.inner.crash_handler).clone();
        *slot = Some(Workers::spawn(
            reader,
            writer,
            registry,
            context,
            &self.inner.config.transport(),
            self.inner.status.clone(),
            crash_handler,
        ));
        drop(slot);

        tracing::info!(%host, port, "connected");
        Ok(())
    }

    /// Queues a command for sending.
    pub fn send_command<T: ClientCommand>(&self, cmd: T) {
        self.send_shared(Arc::new(cmd));
    }

    /// Queues an already shared command for sending.
    ///
    /// When not connected the command is dropped with a warning.
    pub fn send_shared(&self, cmd: SharedCommand) {
        self.inner.send(cmd);
    }

    /// Sends `cmd` every `period` until `disconnect`. Replaces any
    /// keep-alive already running.
    ///
    /// Outside a tokio runtime there is nothing to drive the timer, so
    /// the call is logged and ignored.
    pub fn setup_keep_alive(&self, period: Duration, cmd: SharedCommand) {
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no runtime, keep-alive not started");
            return;
        };
        let target = Arc::downgrade(&self.inner);
        let mut keep_alive = KeepAlive::new(period);
        tracing::info!(
            period_ms = keep_alive.period().as_millis() as u64,
            "keep-alive started"
        );

        let handle = rt.spawn(async move {
            loop {
                let beat = keep_alive.wait_for_beat().await;
                let Some(inner) = target.upgrade() else {
                    break;
                };
                tracing::trace!(beat, "keep-alive");
                inner.send(Arc::clone(&cmd));
            }
        });

        if let Some(old) = lock(&self.inner.keep_alive).replace(handle) {
            old.abort();
        }
    }

    /// Closes the connection.
    ///
    /// Returns immediately: the workers are told to stop and a background
    /// task waits out the shutdown grace period before aborting any that
    /// did not. Safe to call from any task, including a reply running on
    /// the executor. Calling it when not connected does nothing.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    /// `true` while the workers are running and healthy.
    pub fn is_connected(&self) -> bool {
        let running = lock(&self.inner.workers)
            .as_ref()
            .is_some_and(Workers::is_running);
        running && self.inner.status.get() == ConnectionStatus::Connected
    }

    /// Current connection status.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.inner.status.get()
    }

    /// Subscribes to connection status changes.
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.subscribe()
    }

    /// A teardown handle that does not keep this connection alive.
    ///
    /// The login monitor usually lives inside the reply context, which
    /// the connection owns; a strong handle there would be a cycle.
    pub fn teardown_handle(&self) -> Arc<dyn Teardown> {
        Arc::new(WeakTeardown(Arc::downgrade(&self.inner)))
    }

    /// Sends a login command and waits for the server's answer.
    ///
    /// # Errors
    /// [`NetCommError::Session`] if the login was refused or timed out.
    /// A refused login also closes the connection.
    pub async fn login<T: ClientCommand>(
        &self,
        monitor: &LoginMonitor,
        cmd: T,
        timeout: Duration,
    ) -> Result<(), NetCommError> {
        monitor.start_login(self.teardown_handle());
        self.send_command(cmd);
        monitor.wait_for_login(timeout).await?;
        Ok(())
    }

    /// Drops a session whose workers died, so a new one can be opened.
    fn reap_lost_connection(&self) {
        let lost = matches!(self.inner.status.get(), ConnectionStatus::Lost(_))
            || lock(&self.inner.workers)
                .as_ref()
                .is_some_and(|w| !w.is_running());
        if lost {
            tracing::debug!("cleaning up lost connection");
            self.inner.disconnect();
        }
    }
}

impl Teardown for NetComm {
    fn teardown(&self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for NetComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetComm")
            .field("status", &self.inner.status.get())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn send(&self, cmd: SharedCommand) {
        if self.config.debug_protocol {
            tracing::info!("SND: {cmd:?}");
        }
        let queued = lock(&self.workers)
            .as_ref()
            .is_some_and(|w| w.send(Arc::clone(&cmd)));
        if !queued {
            tracing::warn!(?cmd, "not connected, command dropped");
        }
    }

    fn disconnect(&self) {
        if let Some(keep_alive) = lock(&self.keep_alive).take() {
            keep_alive.abort();
        }

        let Some(workers) = lock(&self.workers).take() else {
            return;
        };
        workers.signal_shutdown();
        self.status.set_disconnected();
        tracing::info!("disconnected");

        // Never join from here: this may be running on a worker.
        let grace = self.config.shutdown_grace();
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(workers.join(grace));
            }
            Err(_) => {
                tracing::debug!("no runtime, workers left to stop on their own");
            }
        }
    }
}

struct WeakTeardown(Weak<Inner>);

impl Teardown for WeakTeardown {
    fn teardown(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.disconnect();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Nop;

    impl ClientCommand for Nop {
        fn id(&self) -> u8 {
            0x01
        }

        fn encode(&self, _: &mut netcomm_wire::Writer<'_>) {}
    }

    #[tokio::test]
    async fn test_disconnect_when_not_connected_is_noop() {
        let net = NetComm::new(NetConfig::default());
        net.disconnect();
        net.disconnect();
        assert!(!net.is_connected());
        assert_eq!(net.connection_status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_setup_keep_alive_outside_runtime_is_ignored() {
        let net = NetComm::new(NetConfig::default());
        net.setup_keep_alive(Duration::from_millis(10), Arc::new(Nop));
        assert!(lock(&net.inner.keep_alive).is_none());
    }

    #[tokio::test]
    async fn test_send_command_when_not_connected_is_dropped() {
        let net = NetComm::new(NetConfig::default());
        net.send_command(Nop);
        assert!(!net.is_connected());
    }

    #[tokio::test]
    async fn test_connect_refused_returns_connect_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let net = NetComm::new(NetConfig::default());
        let registry = Arc::new(ReplyRegistry::<()>::new());
        let err = net
            .connect("127.0.0.1", port, registry, Arc::new(()))
            .await
            .unwrap_err();
        assert!(matches!(err, NetCommError::Connect { .. }));
        assert!(!net.is_connected());
    }

    #[tokio::test]
    async fn test_teardown_handle_does_not_keep_connection_alive() {
        let net = NetComm::new(NetConfig::default());
        let handle = net.teardown_handle();
        drop(net);
        // Upgrading fails quietly.
        handle.teardown();
    }
}
