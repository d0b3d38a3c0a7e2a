//! Frame encoding and the resynchronising frame decoder.
//!
//! The stream carries no sync marker. The only way to find a frame
//! boundary is to try one: the inverse-check byte and the checksum tell
//! us whether a candidate header is real. If it is not, we drop a single
//! byte and try again at the next offset. That is slow on garbage but it
//! always recovers, whether the garbage came from corruption or from
//! connecting in the middle of a frame.
//!
//! ```text
//! SeekingHeader ──(6 bytes, check ok)──→ HaveHeader(len, crc)
//!       ↑   └──(check bad: drop 1 byte)──┘        │
//!       │                                 (len bytes buffered)
//!       │                                         ↓
//!       ├───────(crc bad: drop 1 byte)────── HavePayload
//!       │                                         │ (crc ok)
//!       └──────────────────────────────────── Dispatched
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{checksum, hex_dump, WireError, Writer};

/// Size of the fixed frame header in bytes.
pub const HEADER_SIZE: usize = 6;

/// `inverse-check == type-id ^ COMMAND_XOR_MASK` for every valid header.
pub const COMMAND_XOR_MASK: u8 = 0xFF;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Initial receive buffer capacity. The buffer grows past this when a
/// large frame needs it.
const INITIAL_CAPACITY: usize = 10_000;

// ---------------------------------------------------------------------------
// FrameHeader
// ---------------------------------------------------------------------------

/// A parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Message type ID.
    pub id: u8,
    /// Payload length in bytes.
    pub length: u16,
    /// Declared payload checksum.
    pub checksum: u16,
}

impl FrameHeader {
    /// Parses a header from the first [`HEADER_SIZE`] bytes of `bytes`.
    ///
    /// Returns `None` when fewer than six bytes are available or when the
    /// inverse-check byte does not match the type ID, meaning `bytes` does
    /// not start at a frame boundary.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        let id = bytes[0];
        if bytes[1] != id ^ COMMAND_XOR_MASK {
            return None;
        }
        Some(Self {
            id,
            length: u16::from_be_bytes([bytes[2], bytes[3]]),
            checksum: u16::from_be_bytes([bytes[4], bytes[5]]),
        })
    }

    /// Total frame size, header included.
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + usize::from(self.length)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Appends one complete frame to `buf`.
///
/// The header goes in first with a zero length and checksum, `body`
/// writes the payload, and then the real length and checksum are patched
/// into the header. On error `buf` is left exactly as it was.
///
/// ```rust
/// use bytes::BytesMut;
/// use netcomm_wire::encode_frame;
///
/// let mut buf = BytesMut::new();
/// encode_frame(0x0D, &mut buf, |w| w.write_ubyte(122)).unwrap();
/// assert_eq!(&buf[..], &[0x0D, 0xF2, 0x00, 0x01, 0x00, 0x7A, 0x7A]);
/// ```
pub fn encode_frame<F>(
    id: u8,
    buf: &mut BytesMut,
    body: F,
) -> Result<(), WireError>
where
    F: FnOnce(&mut Writer<'_>),
{
    let start = buf.len();
    buf.put_u8(id);
    buf.put_u8(id ^ COMMAND_XOR_MASK);
    buf.put_u16(0);
    buf.put_u16(0);

    let mut writer = Writer::new(buf);
    body(&mut writer);
    if let Err(e) = writer.finish() {
        buf.truncate(start);
        return Err(e);
    }

    let payload_start = start + HEADER_SIZE;
    let len = buf.len() - payload_start;
    let Ok(len16) = u16::try_from(len) else {
        buf.truncate(start);
        return Err(WireError::PayloadTooLarge(len));
    };
    let crc = checksum(&buf[payload_start..]);
    buf[start + 2..start + 4].copy_from_slice(&len16.to_be_bytes());
    buf[start + 4..start + 6].copy_from_slice(&crc.to_be_bytes());
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A frame whose header and checksum were validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Message type ID.
    pub id: u8,
    /// The payload, exactly `length` bytes.
    pub payload: Bytes,
}

/// Sans-IO receive state machine.
///
/// Bytes go in through [`extend`](Self::extend) (or directly into
/// [`buffer_mut`](Self::buffer_mut)), complete frames come out of
/// [`next_frame`](Self::next_frame). The decoder never blocks and never
/// fails: corruption is handled by dropping bytes until a valid frame
/// lines up again.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
    /// Bytes that must be buffered before another attempt can succeed.
    required: usize,
    /// Bytes thrown away while resynchronising. Diagnostics only.
    discarded: u64,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            required: HEADER_SIZE,
            discarded: 0,
        }
    }

    /// Appends received bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// The receive buffer, for reading from a socket without a copy.
    ///
    /// Only append to it; the decoder owns everything already inside.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        if self.buffer.capacity() - self.buffer.len() < self.required {
            self.buffer.reserve(self.required);
        }
        &mut self.buffer
    }

    /// Number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// The bytes currently buffered.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Total bytes that must be buffered before the pending frame
    /// attempt can complete. [`HEADER_SIZE`] while seeking a header.
    pub fn required(&self) -> usize {
        self.required
    }

    /// `true` when bytes are buffered that do not yet form a frame.
    ///
    /// Only meaningful right after [`next_frame`](Self::next_frame)
    /// returned `None`.
    pub fn is_partial(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Total bytes dropped while resynchronising or clearing.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Drops everything buffered and starts seeking a header again.
    ///
    /// Returns the number of bytes thrown away.
    pub fn clear(&mut self) -> usize {
        let n = self.buffer.len();
        if n > 0 {
            tracing::warn!(
                "{}",
                hex_dump("Receiver timeout. Skipping", &self.buffer)
            );
        }
        self.buffer.clear();
        self.required = HEADER_SIZE;
        self.discarded += n as u64;
        n
    }

    /// Extracts the next valid frame, if one is fully buffered.
    ///
    /// Leading bytes that cannot start a valid frame are dropped one at
    /// a time. Returns `None` when more data is needed; the partial frame
    /// stays buffered.
    pub fn next_frame(&mut self) -> Option<RawFrame> {
        loop {
            if self.buffer.len() < HEADER_SIZE {
                self.required = HEADER_SIZE;
                return None;
            }

            let Some(header) = FrameHeader::parse(&self.buffer) else {
                tracing::warn!(byte = self.buffer[0], "skipping invalid data");
                self.skip_one();
                continue;
            };

            let frame_len = header.frame_len();
            if self.buffer.len() < frame_len {
                self.required = frame_len;
                return None;
            }

            let payload = &self.buffer[HEADER_SIZE..frame_len];
            if checksum(payload) != header.checksum {
                tracing::warn!("{}", hex_dump("Invalid CRC", payload));
                self.skip_one();
                continue;
            }

            self.required = HEADER_SIZE;
            let mut frame = self.buffer.split_to(frame_len).freeze();
            frame.advance(HEADER_SIZE);
            return Some(RawFrame {
                id: header.id,
                payload: frame,
            });
        }
    }

    fn skip_one(&mut self) {
        self.buffer.advance(1);
        self.discarded += 1;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
