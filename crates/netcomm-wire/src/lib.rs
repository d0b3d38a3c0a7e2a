//! Wire codec for netcomm.
//!
//! This crate defines the bytes that travel between the client and the
//! game server:
//!
//! - **Primitives** ([`Reader`], [`Writer`]): big-endian integers and
//!   length-prefixed ISO-8859-1 strings.
//! - **Composite types** ([`CharacterId`], [`Location`]): values that
//!   appear in many message layouts, via [`WireEncode`] / [`WireDecode`].
//! - **Framing** ([`encode_frame`], [`FrameDecoder`]): the 6-byte header,
//!   the additive checksum, and the resynchronising receive state machine.
//!
//! # Frame layout
//!
//! ```text
//! byte    type-id
//! byte    inverse check  = type-id XOR 0xFF
//! uint16  payload length (N)
//! uint16  checksum       = (sum of N payload bytes) mod 65535
//! byte[N] payload
//! ```
//!
//! Nothing here touches a socket. The transport crate feeds bytes in and
//! pulls [`RawFrame`]s out.

mod checksum;
mod dump;
mod error;
mod frame;
mod reader;
mod types;
mod writer;

pub use checksum::{checksum, CHECKSUM_MODULUS};
pub use dump::hex_dump;
pub use error::WireError;
pub use frame::{
    encode_frame, FrameDecoder, FrameHeader, RawFrame, COMMAND_XOR_MASK,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use reader::Reader;
pub use types::{CharacterId, Location, WireDecode, WireEncode};
pub use writer::Writer;
