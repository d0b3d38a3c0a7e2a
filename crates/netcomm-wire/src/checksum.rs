//! The additive frame checksum.

/// Modulus of the frame checksum.
///
/// The server computes `sum mod 65535`, not `mod 65536`. Changing this
/// breaks wire compatibility, so the odd-looking value stays.
pub const CHECKSUM_MODULUS: u64 = (1 << 16) - 1;

/// Computes the checksum of a frame payload.
///
/// Every byte counts as an unsigned value in `0..=255`. The input is a
/// plain slice, so computing a checksum can never move a read cursor.
///
/// ```rust
/// use netcomm_wire::checksum;
///
/// assert_eq!(checksum(&[]), 0);
/// assert_eq!(checksum(&[0xFF, 0x01]), 256);
/// ```
pub fn checksum(bytes: &[u8]) -> u16 {
    let sum: u64 = bytes.iter().map(|&b| u64::from(b)).sum();
    // The remainder is always below 65535, so it fits.
    (sum % CHECKSUM_MODULUS) as u16
}
