//! The two message contracts: outbound commands and inbound replies.

use std::fmt;

use bytes::BytesMut;
use netcomm_wire::{encode_frame, Reader, WireError, Writer};

/// A message the client sends to the server.
///
/// Commands are immutable once built. The sender task encodes each one
/// exactly once, in the order they were queued. `encode` writes the
/// fields in the command's fixed layout order; the frame header is not
/// its concern.
///
/// `Debug` is required because protocol debugging logs every command as
/// it is queued (`SND: ...`).
///
/// # Example
///
/// ```rust
/// use netcomm_protocol::ClientCommand;
/// use netcomm_wire::Writer;
///
/// #[derive(Debug)]
/// struct Broadcast(String);
///
/// impl ClientCommand for Broadcast {
///     fn id(&self) -> u8 {
///         0x02
///     }
///
///     fn encode(&self, writer: &mut Writer<'_>) {
///         writer.write_string(&self.0);
///     }
/// }
/// ```
pub trait ClientCommand: fmt::Debug + Send + Sync + 'static {
    /// The frame type ID of this command.
    fn id(&self) -> u8;

    /// Writes the payload fields.
    fn encode(&self, writer: &mut Writer<'_>);
}

/// Appends `cmd` to `buf` as one complete frame.
pub fn encode_command(
    cmd: &dyn ClientCommand,
    buf: &mut BytesMut,
) -> Result<(), WireError> {
    encode_frame(cmd.id(), buf, |w| cmd.encode(w))
}

/// A message the server sends to the client.
///
/// Lifecycle:
///
/// ```text
/// factory() → decode() → [process_now() == false → wait] → execute_update()
///                                                          │
///                                            false ←──────┘ (retried next)
/// ```
///
/// The registry creates an empty instance, the receiver fills it with
/// [`decode`](Self::decode), and the executor runs it. `C` is the
/// execution context: whatever the reply needs to publish its effect
/// (event channels, the login monitor, world state). The transport never
/// looks inside it.
pub trait ServerReply<C>: fmt::Debug + Send + 'static {
    /// Reads the payload fields, in the same order the server wrote them.
    fn decode(&mut self, reader: &mut Reader<'_>) -> Result<(), WireError>;

    /// Applies the reply.
    ///
    /// Returns `true` when done. Returning `false` means "not finished,
    /// try me again": the executor retries this same reply before it
    /// touches anything newer.
    fn execute_update(&mut self, ctx: &C) -> bool;

    /// Whether the reply may run now.
    ///
    /// A reply that depends on data not yet available returns `false` and
    /// is parked in the executor's delayed queue until it is ready.
    fn process_now(&self, _ctx: &C) -> bool {
        true
    }
}
