//! Writing primitive values into an outgoing frame.

use bytes::{BufMut, BytesMut};

use crate::{WireEncode, WireError};

/// Appends big-endian values to a frame buffer.
///
/// Commands encode themselves through a `Writer` and the encode methods
/// do not return `Result`: a command's layout is fixed, so the only thing
/// that can go wrong is an oversized string. That error is remembered and
/// reported once by [`Writer::finish`], which [`encode_frame`] calls.
///
/// [`encode_frame`]: crate::encode_frame
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut BytesMut,
    error: Option<WireError>,
}

impl<'a> Writer<'a> {
    /// Creates a writer that appends to `buf`.
    pub fn new(buf: &'a mut BytesMut) -> Self {
        Self { buf, error: None }
    }

    pub fn write_ubyte(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_byte(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    pub fn write_ushort(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    pub fn write_short(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    pub fn write_uint(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub fn write_int(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    /// Writes a `u16` length prefix and the ISO-8859-1 bytes of `value`.
    ///
    /// Characters outside latin-1 have no single-byte form and are sent
    /// as `?`. A string longer than 65535 characters is not written at
    /// all; the error surfaces from [`Writer::finish`].
    pub fn write_string(&mut self, value: &str) {
        let len = value.chars().count();
        let Ok(prefix) = u16::try_from(len) else {
            self.error.get_or_insert(WireError::StringTooLong(len));
            return;
        };
        self.buf.reserve(2 + len);
        self.buf.put_u16(prefix);
        for c in value.chars() {
            self.buf.put_u8(u8::try_from(c).unwrap_or(b'?'));
        }
    }

    /// Encodes a composite value.
    pub fn write<T: WireEncode + ?Sized>(&mut self, value: &T) {
        value.encode(self);
    }

    /// Returns the first error hit while writing, if any.
    pub fn finish(self) -> Result<(), WireError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reader;

    #[test]
    fn test_write_string_layout() {
        let mut buf = BytesMut::new();
        let mut w = Writer::new(&mut buf);
        w.write_string("alice");
        w.finish().unwrap();
        assert_eq!(&buf[..], b"\x00\x05alice");
    }

    #[test]
    fn test_write_string_replaces_non_latin1() {
        let mut buf = BytesMut::new();
        let mut w = Writer::new(&mut buf);
        w.write_string("a€ü");
        w.finish().unwrap();
        assert_eq!(&buf[..], &[0x00, 0x03, b'a', b'?', 0xFC]);
    }

    #[test]
    fn test_write_string_too_long_reports_error() {
        let mut buf = BytesMut::new();
        let mut w = Writer::new(&mut buf);
        w.write_string(&"x".repeat(70_000));
        assert_eq!(w.finish(), Err(WireError::StringTooLong(70_000)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_written_values_read_back_in_order() {
        let mut buf = BytesMut::new();
        let mut w = Writer::new(&mut buf);
        w.write_ubyte(122);
        w.write_short(-5);
        w.write_uint(3_000_000_000);
        w.write_string("Gür");
        w.write_int(-1);
        w.finish().unwrap();

        let mut r = Reader::new(&buf);
        assert_eq!(r.read_ubyte().unwrap(), 122);
        assert_eq!(r.read_short().unwrap(), -5);
        assert_eq!(r.read_uint().unwrap(), 3_000_000_000);
        assert_eq!(r.read_string().unwrap(), "Gür");
        assert_eq!(r.read_int().unwrap(), -1);
        assert!(r.is_empty());
    }
}
