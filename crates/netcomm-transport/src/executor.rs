//! Message executor: runs decoded replies, strictly in order.
//!
//! The executor is the only consumer of the inbound queue. It keeps two
//! pieces of private state:
//!
//! - a **delayed queue** for replies whose `process_now` said "not yet";
//!   its head is re-checked before any new input is taken, so parked
//!   work drains as soon as it becomes ready;
//! - a **repeat slot** for the one reply whose `execute_update` returned
//!   `false`. It is retried before anything else is taken, which keeps
//!   at most one reply in flight and nothing overtaking it.
//!
//! Replies run synchronously on the executor task. A panicking reply is
//! caught, logged, handed to the crash handler, and discarded; the loop
//! itself keeps going.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use netcomm_protocol::ServerReply;
use tokio::sync::mpsc;
use tokio::time;

use crate::{panic_message, CrashHandler, ShutdownSignal, TransportConfig};

/// A decoded reply waiting to be executed.
pub type BoxedReply<C> = Box<dyn ServerReply<C>>;

/// Executes replies from the inbound queue against a shared context.
pub struct MessageExecutor<C> {
    inbound: mpsc::Receiver<BoxedReply<C>>,
    delayed: VecDeque<BoxedReply<C>>,
    repeat: Option<BoxedReply<C>>,
    context: Arc<C>,
    delayed_poll: Duration,
    network_debug: bool,
    crash_handler: Option<CrashHandler>,
}

enum Next<C> {
    Reply(BoxedReply<C>),
    /// Poll interval elapsed; re-check the delayed queue.
    Idle,
    Stop,
}

impl<C> MessageExecutor<C>
where
    C: Send + Sync + 'static,
{
    pub fn new(
        inbound: mpsc::Receiver<BoxedReply<C>>,
        context: Arc<C>,
        config: &TransportConfig,
        crash_handler: Option<CrashHandler>,
    ) -> Self {
        Self {
            inbound,
            delayed: VecDeque::new(),
            repeat: None,
            context,
            delayed_poll: config.delayed_poll,
            network_debug: config.network_debug,
            crash_handler,
        }
    }

    /// Runs until shutdown or until the inbound queue closes.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) {
        tracing::debug!("executor started");

        while !shutdown.is_triggered() {
            let head_ready = self
                .delayed
                .front()
                .is_some_and(|reply| reply.process_now(&self.context));
            if head_ready {
                if let Some(reply) = self.delayed.pop_front() {
                    self.execute(reply);
                }
                continue;
            }

            let reply = match self.repeat.take() {
                Some(reply) => {
                    // Give the rest of the runtime a turn between retries.
                    tokio::task::yield_now().await;
                    reply
                }
                None => match self.next_inbound(&mut shutdown).await {
                    Next::Reply(reply) => reply,
                    Next::Idle => continue,
                    Next::Stop => break,
                },
            };

            if reply.process_now(&self.context) {
                self.execute(reply);
            } else {
                self.delayed.push_back(reply);
            }
        }

        tracing::info!(
            delayed = self.delayed.len(),
            "executor: shutting down"
        );
    }

    async fn next_inbound(&mut self, shutdown: &mut ShutdownSignal) -> Next<C> {
        let poll = (!self.delayed.is_empty()).then_some(self.delayed_poll);
        let idle = async move {
            match poll {
                Some(d) => time::sleep(d).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = shutdown.triggered() => Next::Stop,
            reply = self.inbound.recv() => match reply {
                Some(reply) => Next::Reply(reply),
                None => Next::Stop,
            },
            _ = idle => Next::Idle,
        }
    }

    fn execute(&mut self, mut reply: BoxedReply<C>) {
        if self.network_debug {
            tracing::debug!("executing {reply:?}");
        }

        let ctx = Arc::clone(&self.context);
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| reply.execute_update(&ctx)));

        match outcome {
            Ok(true) => {
                if self.network_debug {
                    tracing::debug!("finished {reply:?}");
                }
            }
            Ok(false) => {
                if self.network_debug {
                    tracing::debug!("repeating {reply:?}");
                }
                self.repeat = Some(reply);
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(%message, "reply panicked during execution, discarded");
                if let Some(handler) = &self.crash_handler {
                    handler("executor", &message);
                }
            }
        }
    }
}
