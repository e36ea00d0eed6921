//! bfloat16 conversions.
//!
//! bfloat16 shares f32's sign and 8-bit exponent layout with only an 8-bit
//! mantissa, so decode is a zero-extend into the high half of an f32 pattern
//! and encode is a truncation with round-to-nearest-even on the dropped low
//! 16 bits.

/// Canonical NaN pattern produced by the encode.
const CANONICAL_NAN_BF16: u16 = 0x7FC0;

/// Decode a bfloat16 bit pattern to `f32` by zero-extending it into the
/// high half of the f32 pattern.
pub fn bfloat16_to_f32(bits: u16) -> f32 {
    f32::from_bits(u32::from(bits) << 16)
}

/// Encode an `f32` as a bfloat16 bit pattern.
///
/// The dropped 16 mantissa bits round to nearest-even via an lsb-biased add.
/// NaNs canonicalize to one pattern. bfloat16 covers f32's whole exponent
/// range, so only rounding at the max finite exponent can carry into the
/// infinity pattern.
pub fn f32_to_bfloat16(value: f32) -> u16 {
    if value.is_nan() {
        return CANONICAL_NAN_BF16;
    }
    let bits = value.to_bits();
    let lsb = (bits >> 16) & 1;
    let rounded = bits.wrapping_add(0x7FFF + lsb);
    (rounded >> 16) as u16
}
