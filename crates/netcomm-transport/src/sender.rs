//! Command sender: queued commands → socket bytes.

use std::sync::Arc;

use bytes::BytesMut;
use netcomm_protocol::{encode_command, ClientCommand};
use netcomm_wire::hex_dump;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::{ShutdownSignal, TransportConfig, TransportError};

/// A queued command. Shared so a keep-alive can be sent many times.
pub type SharedCommand = Arc<dyn ClientCommand>;

/// Sending half of the outbound command queue.
///
/// Unbounded: queueing a command never waits.
pub type CommandQueue = mpsc::UnboundedSender<SharedCommand>;

/// Encodes queued commands and writes them to `W`, one frame each, in
/// queue order.
pub struct CommandSender<W> {
    writer: W,
    outbound: mpsc::UnboundedReceiver<SharedCommand>,
    scratch: BytesMut,
    network_debug: bool,
}

impl<W> CommandSender<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(
        writer: W,
        outbound: mpsc::UnboundedReceiver<SharedCommand>,
        config: &TransportConfig,
    ) -> Self {
        Self {
            writer,
            outbound,
            scratch: BytesMut::with_capacity(1024),
            network_debug: config.network_debug,
        }
    }

    /// Runs until shutdown, the queue closes, or a write fails.
    ///
    /// # Errors
    /// [`TransportError::SendFailed`] if the socket rejects a write.
    pub async fn run(
        mut self,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), TransportError> {
        tracing::debug!("sender started");

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.triggered() => None,
                cmd = self.outbound.recv() => cmd,
            };
            let Some(cmd) = next else {
                break;
            };

            self.scratch.clear();
            if let Err(e) = encode_command(cmd.as_ref(), &mut self.scratch) {
                tracing::error!(?cmd, error = %e, "command does not fit a frame, dropped");
                continue;
            }
            if self.network_debug {
                tracing::debug!("{}", hex_dump("snd =>", &self.scratch));
            }

            let written = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                res = write_frame(&mut self.writer, &self.scratch) => res,
            };
            written.map_err(TransportError::SendFailed)?;
        }

        tracing::info!("sender: shutting down");
        // The peer may already be gone; nothing useful to do on failure.
        let _ = self.writer.shutdown().await;
        Ok(())
    }
}

async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await?;
    writer.flush().await
}
