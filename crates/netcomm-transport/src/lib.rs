//! Connection workers for netcomm.
//!
//! A live connection is three tokio tasks joined by two queues:
//!
//! ```text
//!            outbound (unbounded)                 socket write half
//! caller ──────────────────────────→ CommandSender ───────────────→ server
//!
//!            socket read half        inbound (bounded)
//! server ──────────────→ FrameReceiver ─────────────→ MessageExecutor ──→ context
//! ```
//!
//! [`Workers::spawn`] starts all three over any `AsyncRead` /
//! `AsyncWrite` pair, so the same code runs over TCP in production and
//! over `tokio::io::duplex` in tests.
//!
//! Shutdown is cooperative: every blocking wait in every worker races a
//! [`ShutdownSignal`]. Nothing here ever joins the task it runs on, so
//! a reply executing on the executor can safely tear the connection
//! down.

mod error;
mod executor;
mod receiver;
mod sender;
mod signal;

pub use error::TransportError;
pub use executor::{BoxedReply, MessageExecutor};
pub use receiver::{FrameReceiver, ReplySender};
pub use sender::{CommandQueue, CommandSender, SharedCommand};
pub use signal::{
    shutdown_channel, ConnectionStatus, ShutdownSignal, ShutdownTrigger,
    StatusHandle,
};

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use netcomm_protocol::ReplyRegistry;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Called with the worker name and the panic message when a worker (or a
/// reply running on the executor) panics.
pub type CrashHandler = Arc<dyn Fn(&str, &str) + Send + Sync>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the three workers.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Hex-dump every chunk read and frame written, and log each reply as
    /// it is decoded and executed.
    pub network_debug: bool,

    /// Capacity of the inbound reply queue. A full queue stops the
    /// receiver from reading.
    pub inbound_capacity: usize,

    /// How long a half-received frame may wait for more bytes before the
    /// receive buffer is discarded.
    pub reassembly_timeout: Duration,

    /// How often the executor re-checks parked replies while the inbound
    /// queue is idle.
    pub delayed_poll: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            network_debug: false,
            inbound_capacity: 1024,
            reassembly_timeout: Duration::from_millis(1000),
            delayed_poll: Duration::from_millis(10),
        }
    }
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

/// The three running workers of one connection.
#[derive(Debug)]
pub struct Workers {
    outbound: CommandQueue,
    trigger: ShutdownTrigger,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Workers {
    /// Starts the sender, receiver, and executor, in that order.
    pub fn spawn<R, W, C>(
        reader: R,
        writer: W,
        registry: Arc<ReplyRegistry<C>>,
        context: Arc<C>,
        config: &TransportConfig,
        status: StatusHandle,
        crash_handler: Option<CrashHandler>,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
        C: Send + Sync + 'static,
    {
        let (trigger, signal) = shutdown_channel();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) =
            mpsc::channel(config.inbound_capacity.max(1));

        let sender = CommandSender::new(writer, outbound_rx, config);
        let receiver =
            FrameReceiver::new(reader, registry, inbound_tx, config);
        let executor = MessageExecutor::new(
            inbound_rx,
            context,
            config,
            crash_handler.clone(),
        );

        let handles = vec![
            (
                "sender",
                spawn_worker(
                    "sender",
                    sender.run(signal.clone()),
                    status.clone(),
                    crash_handler.clone(),
                ),
            ),
            (
                "receiver",
                spawn_worker(
                    "receiver",
                    receiver.run(signal.clone()),
                    status.clone(),
                    crash_handler.clone(),
                ),
            ),
            (
                "executor",
                spawn_worker(
                    "executor",
                    executor.run(signal).map(Ok),
                    status,
                    crash_handler,
                ),
            ),
        ];

        Self {
            outbound,
            trigger,
            handles,
        }
    }

    /// Queues a command for the sender. Never waits.
    ///
    /// Returns `false` if the sender has already stopped.
    pub fn send(&self, cmd: SharedCommand) -> bool {
        self.outbound.send(cmd).is_ok()
    }

    /// Asks all workers to stop. Does not wait for them.
    pub fn signal_shutdown(&self) {
        self.trigger.trigger();
    }

    /// `true` while every worker is still running.
    pub fn is_running(&self) -> bool {
        self.handles.iter().all(|(_, h)| !h.is_finished())
    }

    /// Signals shutdown and waits up to `grace` for each worker, aborting
    /// any that have not stopped by then.
    ///
    /// Must not be awaited from one of these workers; spawn it instead.
    pub async fn join(self, grace: Duration) {
        self.trigger.trigger();
        drop(self.outbound);
        for (name, mut handle) in self.handles {
            if tokio::time::timeout(grace, &mut handle).await.is_err() {
                tracing::warn!(worker = name, "worker did not stop in time, aborting");
                handle.abort();
            }
        }
    }
}

/// Spawns a worker future and reports how it ended.
fn spawn_worker<F>(
    name: &'static str,
    worker: F,
    status: StatusHandle,
    crash_handler: Option<CrashHandler>,
) -> JoinHandle<()>
where
    F: Future<Output = Result<(), TransportError>> + Send + 'static,
{
    tokio::spawn(async move {
        match AssertUnwindSafe(worker).catch_unwind().await {
            Ok(Ok(())) => {
                tracing::debug!(worker = name, "worker stopped");
            }
            Ok(Err(e)) => {
                tracing::error!(
                    worker = name,
                    error = %e,
                    "the connection to the server is not working anymore"
                );
                status.mark_lost(e.to_string());
            }
            Err(payload) => {
                let err = TransportError::Panicked {
                    worker: name,
                    message: panic_message(payload.as_ref()),
                };
                tracing::error!(worker = name, error = %err, "worker crashed");
                if let Some(handler) = &crash_handler {
                    handler(name, &err.to_string());
                }
                status.mark_lost(err.to_string());
            }
        }
    })
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
