//! Hex dumps for network debugging.

use std::fmt::Write;

/// Bytes below this value print as `.` in the text column.
const FIRST_PRINTABLE: u8 = 0x41;

/// Formats `bytes` as a one-line hex dump.
///
/// The format is `prefix [AB][CD] [2 byte] <text>`, where the text
/// column shows bytes from `A` upward as latin-1 characters and
/// everything else as `.`.
///
/// ```rust
/// use netcomm_wire::hex_dump;
///
/// assert_eq!(hex_dump("rcv <=", b"Hi!"), "rcv <= [48][69][21] [3 byte] <Hi.>");
/// ```
pub fn hex_dump(prefix: &str, bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 4);
    let mut text = String::with_capacity(bytes.len());
    for &b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(hex, "[{b:02X}]");
        text.push(if b >= FIRST_PRINTABLE { char::from(b) } else { '.' });
    }
    format!("{prefix} {hex} [{} byte] <{text}>", bytes.len())
}
