//! Byte order reversal for fixed-width unsigned integers.

/// Reverses the byte order of a 16-bit value
#[inline]
pub const fn swap_endian16(num: u16) -> u16 {
    num.swap_bytes()
}

/// Reverses the byte order of a 32-bit value
#[inline]
pub const fn swap_endian32(num: u32) -> u32 {
    num.swap_bytes()
}

/// Reverses the byte order of a 64-bit value
#[inline]
pub const fn swap_endian64(num: u64) -> u64 {
    num.swap_bytes()
}
