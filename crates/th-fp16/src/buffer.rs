//! Bulk buffer conversion helpers.

use crate::{bfloat16_to_f32, binary16_to_f32, f32_to_bfloat16, f32_to_binary16};

/// The two supported 16-bit float encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HalfEncoding {
    /// IEEE-754 half precision (1 sign, 5 exponent, 10 mantissa bits).
    Binary16,
    /// bfloat16 (1 sign, 8 exponent, 8 mantissa bits).
    Bfloat16,
}

/// Widen a buffer of 16-bit patterns to `f32`, element-wise, preserving
/// order and length.
pub fn widen_buffer(src: &[u16], encoding: HalfEncoding) -> Vec<f32> {
    match encoding {
        HalfEncoding::Binary16 => src.iter().map(|&b| binary16_to_f32(b)).collect(),
        HalfEncoding::Bfloat16 => src.iter().map(|&b| bfloat16_to_f32(b)).collect(),
    }
}

/// Narrow a buffer of `f32` values to 16-bit patterns, element-wise,
/// preserving order and length.
pub fn narrow_buffer(src: &[f32], encoding: HalfEncoding) -> Vec<u16> {
    match encoding {
        HalfEncoding::Binary16 => src.iter().map(|&v| f32_to_binary16(v)).collect(),
        HalfEncoding::Bfloat16 => src.iter().map(|&v| f32_to_bfloat16(v)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_preserves_order_and_length() {
        let src = [0x3C00u16, 0xC000, 0x0000, 0x7BFF];
        let out = widen_buffer(&src, HalfEncoding::Binary16);
        assert_eq!(out, vec![1.0, -2.0, 0.0, 65504.0]);

        let src = [0x3F80u16, 0xC000, 0x8000];
        let out = widen_buffer(&src, HalfEncoding::Bfloat16);
        assert_eq!(out, vec![1.0, -2.0, -0.0]);
    }

    #[test]
    fn test_narrow_preserves_order_and_length() {
        let src = [1.0f32, -2.0, 65504.0, 1e10];
        let out = narrow_buffer(&src, HalfEncoding::Binary16);
        assert_eq!(out, vec![0x3C00, 0xC000, 0x7BFF, 0x7C00]);

        let src = [1.0f32, -2.0];
        let out = narrow_buffer(&src, HalfEncoding::Bfloat16);
        assert_eq!(out, vec![0x3F80, 0xC000]);
    }

    #[test]
    fn test_empty_buffers() {
        assert!(widen_buffer(&[], HalfEncoding::Binary16).is_empty());
        assert!(narrow_buffer(&[], HalfEncoding::Bfloat16).is_empty());
    }

    #[test]
    fn test_widen_narrow_round_trip() {
        let patterns: Vec<u16> = (0..256u16).map(|i| i * 257).collect();
        for encoding in [HalfEncoding::Binary16, HalfEncoding::Bfloat16] {
            let widened = widen_buffer(&patterns, encoding);
            let narrowed = narrow_buffer(&widened, encoding);
            assert_eq!(narrowed.len(), patterns.len());
            for (i, (&before, &after)) in patterns.iter().zip(&narrowed).enumerate() {
                if widened[i].is_nan() {
                    assert!(widen_buffer(&[after], encoding)[0].is_nan());
                } else {
                    assert_eq!(before, after);
                }
            }
        }
    }
}
