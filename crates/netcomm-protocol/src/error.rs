//! Error types for the protocol layer.

use netcomm_wire::WireError;

/// Errors that can occur while setting up or using the message contracts.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Two reply types were registered under the same ID.
    ///
    /// This is a setup mistake, caught before any connection is opened.
    #[error("reply id 0x{0:02X} registered twice")]
    DuplicateReply(u8),

    /// A command or reply did not fit its wire layout.
    #[error(transparent)]
    Wire(#[from] WireError),
}
