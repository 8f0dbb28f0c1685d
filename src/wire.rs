//! Wire byte order.
//!
//! EVE chips are little-endian for 8, 16 and 32 bit register access. The one
//! exception is the 24-bit memory address that starts every host transaction,
//! which goes out most significant byte first.

/// Encodes an 8-bit value.
#[inline]
pub const fn encode_u8(value: u8) -> [u8; 1] {
    [value]
}

/// Encodes a 16-bit value, least significant byte first.
#[inline]
pub const fn encode_u16(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Encodes the low 24 bits of `value`, most significant byte first.
///
/// The top byte of `value` is ignored.
#[inline]
pub const fn encode_u24_be(value: u32) -> [u8; 3] {
    [(value >> 16) as u8, (value >> 8) as u8, value as u8]
}

/// Encodes a 32-bit value, least significant byte first.
#[inline]
pub const fn encode_u32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

#[inline]
pub const fn decode_u8(bytes: [u8; 1]) -> u8 {
    bytes[0]
}

#[inline]
pub const fn decode_u16(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// Decodes a big-endian 24-bit value into the low bits of a `u32`.
#[inline]
pub const fn decode_u24_be(bytes: [u8; 3]) -> u32 {
    ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32
}

#[inline]
pub const fn decode_u32(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Largest value representable in a 24-bit field.
pub const U24_MAX: u32 = 0x00FF_FFFF;
