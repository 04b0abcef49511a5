//! Bit-level primitives used by the key kinds.
//!
//! Bits are numbered from the most significant bit of the first byte: bit `0`
//! is the MSB of byte `0`, bit `8` the MSB of byte `1`, and so on. This is the
//! order in which memcmp compares, so a longer common prefix always means
//! "closer" in sort order too.

#[inline]
fn bit_byte_index(bit: usize) -> usize {
    bit / 8
}

/// Bit index within its byte, where `0` is the MSB and `7` is the LSB.
#[inline]
fn bit_in_byte_msb0(bit: usize) -> u32 {
    (bit % 8) as u32
}

/// Mask keeping the bits at and after `bit_in_byte_msb0`.
#[inline]
fn mask_from_bit_in_byte(bit_in_byte_msb0: u32) -> u8 {
    debug_assert!(bit_in_byte_msb0 <= 7);
    0xFFu8 >> bit_in_byte_msb0
}

/// Number of leading bits `a` and `b` have in common.
///
/// Comparison starts at bit `skip` (the caller guarantees the bits before it
/// are already known to be equal) and stops at bit `max`; the result is the
/// absolute position of the first differing bit, or `max` if none differs
/// before it. Both slices must hold at least `max` bits.
pub fn equal_bits(a: &[u8], b: &[u8], skip: usize, max: usize) -> usize {
    if skip >= max {
        return max;
    }

    let mut i = bit_byte_index(skip);
    let mut mask = mask_from_bit_in_byte(bit_in_byte_msb0(skip));
    let end = bit_byte_index(max + 7);

    while i < end {
        let x = (a[i] ^ b[i]) & mask;
        if x != 0 {
            return (i * 8 + x.leading_zeros() as usize).min(max);
        }
        mask = 0xFF;
        i += 1;
    }
    max
}

/// Number of leading bits two NUL-terminated strings have in common.
///
/// The end of a slice counts as its terminator, as does the first NUL byte
/// inside it. Returns `None` when both strings reach their terminator at the
/// same time, i.e. they are equal. Comparison starts at bit `skip`, which
/// must not lie past either terminator.
pub fn string_equal_bits(a: &[u8], b: &[u8], skip: usize) -> Option<usize> {
    let mut i = bit_byte_index(skip);
    let mut mask = mask_from_bit_in_byte(bit_in_byte_msb0(skip));

    loop {
        let ca = a.get(i).copied().unwrap_or(0);
        let cb = b.get(i).copied().unwrap_or(0);
        let x = (ca ^ cb) & mask;
        if x != 0 {
            return Some(i * 8 + x.leading_zeros() as usize);
        }
        if ca == 0 && cb == 0 {
            return None;
        }
        mask = 0xFF;
        i += 1;
    }
}

/// Highest set bit of a non-zero value, counted from 1 (`flsnz(1) == 1`).
#[inline]
pub fn flsnz(x: u64) -> u32 {
    debug_assert_ne!(x, 0);
    u64::BITS - x.leading_zeros()
}

/// Bytes of a NUL-terminated buffer up to (excluding) its first NUL.
#[inline]
pub(crate) fn until_nul(s: &[u8]) -> &[u8] {
    match s.iter().position(|&c| c == 0) {
        Some(end) => &s[..end],
        None => s,
    }
}
