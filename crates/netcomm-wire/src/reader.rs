//! Reading primitive values out of a frame payload.

use crate::{WireDecode, WireError};

/// A cursor over one frame's payload.
///
/// All multi-byte values are big-endian. The reader is bounded to the
/// slice it was created with: reading past the end is an error, not a
/// peek into whatever follows in the receive buffer.
///
/// ## Signed and unsigned reads
///
/// The server thinks in signed values; unsigned reads are the same bits
/// reinterpreted (a negative `i16` becomes `value + 65536`). In Rust this
/// is just `as`, so each signed read is defined in terms of its unsigned
/// twin.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Takes the next `n` bytes, or fails without moving the cursor.
    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if n > self.remaining() {
            return Err(WireError::UnexpectedEnd {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_ubyte(&mut self) -> Result<u8, WireError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_byte(&mut self) -> Result<i8, WireError> {
        Ok(self.read_ubyte()? as i8)
    }

    pub fn read_ushort(&mut self) -> Result<u16, WireError> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn read_short(&mut self) -> Result<i16, WireError> {
        Ok(self.read_ushort()? as i16)
    }

    pub fn read_uint(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn read_int(&mut self) -> Result<i32, WireError> {
        Ok(self.read_uint()? as i32)
    }

    /// Reads a `u16` length prefix followed by that many ISO-8859-1 bytes.
    ///
    /// Every latin-1 byte maps to the Unicode code point of the same
    /// value, so decoding never fails once the bytes are there.
    pub fn read_string(&mut self) -> Result<String, WireError> {
        let len = usize::from(self.read_ushort()?);
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.take(len)?;
        Ok(bytes.iter().map(|&b| char::from(b)).collect())
    }

    /// Decodes a composite value.
    ///
    /// ```rust
    /// use netcomm_wire::{Location, Reader};
    ///
    /// let bytes = [0x00, 0x01, 0xFF, 0xFE, 0x00, 0x00];
    /// let mut reader = Reader::new(&bytes);
    /// let loc: Location = reader.read().unwrap();
    /// assert_eq!(loc, Location::new(1, -2, 0));
    /// ```
    pub fn read<T: WireDecode>(&mut self) -> Result<T, WireError> {
        T::decode(self)
    }
}
