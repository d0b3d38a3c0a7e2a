//! Frame receiver: socket bytes → decoded replies.
//!
//! The receiver owns the read half of the socket and the
//! [`FrameDecoder`]. It is the only place where bytes become replies,
//! and the only place that waits on the network for input.
//!
//! Two waits matter here:
//!
//! - **Socket reads.** A half-received frame arms the reassembly
//!   timeout. If no new bytes arrive before it fires, the buffer is
//!   dumped and cleared, so a stalled sender cannot leave a broken frame
//!   in front of everything that follows.
//! - **Inbound queue sends.** The queue is bounded. When the executor
//!   falls behind, the receiver stops reading, which in turn lets TCP
//!   flow control slow the server down.

use std::sync::Arc;
use std::time::Duration;

use netcomm_protocol::{ReplyRegistry, ServerReply};
use netcomm_wire::{hex_dump, FrameDecoder, RawFrame};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::{ShutdownSignal, TransportConfig, TransportError};

/// Sending half of the inbound reply queue.
pub type ReplySender<C> = mpsc::Sender<Box<dyn ServerReply<C>>>;

/// Reads frames from `R` and queues the decoded replies.
pub struct FrameReceiver<R, C> {
    reader: R,
    decoder: FrameDecoder,
    registry: Arc<ReplyRegistry<C>>,
    inbound: ReplySender<C>,
    reassembly_timeout: Duration,
    network_debug: bool,
}

/// What woke the receive loop up.
enum Wake {
    Shutdown,
    Read(std::io::Result<usize>),
    Stalled,
}

impl<R, C> FrameReceiver<R, C>
where
    R: AsyncRead + Unpin + Send + 'static,
    C: Send + Sync + 'static,
{
    pub fn new(
        reader: R,
        registry: Arc<ReplyRegistry<C>>,
        inbound: ReplySender<C>,
        config: &TransportConfig,
    ) -> Self {
        Self {
            reader,
            decoder: FrameDecoder::new(),
            registry,
            inbound,
            reassembly_timeout: config.reassembly_timeout,
            network_debug: config.network_debug,
        }
    }

    /// Runs until shutdown, end of stream, or a read error.
    ///
    /// # Errors
    /// [`TransportError::ConnectionClosed`] when the server closes the
    /// stream, [`TransportError::ReceiveFailed`] on a read error. A
    /// shutdown request is not an error.
    pub async fn run(
        mut self,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), TransportError> {
        tracing::debug!("receiver started");
        let mut deadline: Option<Instant> = None;

        loop {
            while let Some(frame) = self.decoder.next_frame() {
                if !self.dispatch(frame, &mut shutdown).await {
                    tracing::debug!("receiver stopping");
                    return Ok(());
                }
            }

            // Leftover bytes mean a frame is half here. The clock starts
            // when that is first seen and restarts on every read.
            if !self.decoder.is_partial() {
                deadline = None;
            } else if deadline.is_none() {
                deadline = Some(Instant::now() + self.reassembly_timeout);
            }

            let wake = {
                let stall = async move {
                    match deadline {
                        Some(at) => time::sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                };
                tokio::select! {
                    biased;
                    _ = shutdown.triggered() => Wake::Shutdown,
                    read = self.reader.read_buf(self.decoder.buffer_mut()) => {
                        Wake::Read(read)
                    }
                    _ = stall => Wake::Stalled,
                }
            };

            match wake {
                Wake::Shutdown => {
                    tracing::info!("receiver: shutdown requested");
                    return Ok(());
                }
                Wake::Read(Ok(0)) => {
                    return Err(TransportError::ConnectionClosed(
                        "server closed the stream".into(),
                    ));
                }
                Wake::Read(Ok(n)) => {
                    if self.network_debug {
                        let bytes = self.decoder.as_bytes();
                        tracing::debug!(
                            "{}",
                            hex_dump("rcv <=", &bytes[bytes.len() - n..])
                        );
                    }
                    deadline = None;
                }
                Wake::Read(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(e));
                }
                Wake::Stalled => {
                    let dropped = self.decoder.clear();
                    tracing::warn!(dropped, "frame reassembly timed out");
                    deadline = None;
                }
            }
        }
    }

    /// Decodes one frame and queues the reply.
    ///
    /// Returns `false` when the receiver should stop (shutdown requested
    /// or the executor is gone).
    async fn dispatch(
        &mut self,
        frame: RawFrame,
        shutdown: &mut ShutdownSignal,
    ) -> bool {
        let id = frame.id;
        let reply = match self.registry.decode(id, &frame.payload) {
            Some(Ok(reply)) => reply,
            Some(Err(e)) => {
                tracing::error!(id, error = %e, "failed to decode reply, frame dropped");
                return true;
            }
            None => {
                tracing::debug!(
                    id,
                    len = frame.payload.len(),
                    "unknown reply id, frame dropped"
                );
                return true;
            }
        };

        if self.network_debug {
            tracing::debug!("REC: {reply:?}");
        }

        tokio::select! {
            biased;
            _ = shutdown.triggered() => false,
            sent = self.inbound.send(reply) => {
                if sent.is_err() {
                    tracing::warn!("executor gone, receiver has nobody to feed");
                }
                sent.is_ok()
            }
        }
    }
}
