//! Error types for the wire layer.
//!
//! Each crate in netcomm defines its own error enum. A `WireError` always
//! means "these bytes do not fit the layout", never a socket problem.

/// Errors that can occur while encoding or decoding wire data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// A read needed more bytes than the payload holds.
    ///
    /// The reader is bounded to one frame's payload, so this never reads
    /// into the next frame. It means the reply layout and the bytes the
    /// server sent disagree.
    #[error(
        "reading beyond payload: needed {needed} bytes, {remaining} remaining"
    )]
    UnexpectedEnd {
        /// Bytes the read asked for.
        needed: usize,
        /// Bytes left in the payload.
        remaining: usize,
    },

    /// The encoded payload does not fit the 16-bit length field.
    #[error("payload of {0} bytes exceeds the frame limit of 65535 bytes")]
    PayloadTooLarge(usize),

    /// A string does not fit its 16-bit length prefix.
    #[error("string of {0} bytes exceeds the 65535 byte length prefix")]
    StringTooLong(usize),
}
