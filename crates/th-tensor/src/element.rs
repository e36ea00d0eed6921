use std::fmt;

use half::{bf16, f16};

/// Supported element types for tensor storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Int64,
    Float32,
    Float64,
    /// 16-bit IEEE-754 half precision.
    Float16,
    /// 16-bit bfloat16 (f32's exponent range, 8 mantissa bits).
    Bfloat16,
    /// Strings are stored as managed text, not a linear numeric buffer.
    String,
}

impl ElementType {
    /// Byte width of a single element, or `None` for strings.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            ElementType::Bool | ElementType::Int8 | ElementType::Uint8 => Some(1),
            ElementType::Int16
            | ElementType::Uint16
            | ElementType::Float16
            | ElementType::Bfloat16 => Some(2),
            ElementType::Int32 | ElementType::Float32 => Some(4),
            ElementType::Int64 | ElementType::Float64 => Some(8),
            ElementType::String => None,
        }
    }

    /// True for the 16-bit floating point encodings.
    pub fn is_half_float(&self) -> bool {
        matches!(self, ElementType::Float16 | ElementType::Bfloat16)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Bool => "bool",
            ElementType::Int8 => "int8",
            ElementType::Uint8 => "uint8",
            ElementType::Int16 => "int16",
            ElementType::Uint16 => "uint16",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Float16 => "float16",
            ElementType::Bfloat16 => "bfloat16",
            ElementType::String => "string",
        };
        write!(f, "{}", name)
    }
}

/// Little-endian byte codec for a fixed-width host scalar.
///
/// The implementations form the closed conversion table used to move typed
/// values in and out of raw tensor storage, one per fixed-width member of
/// [`ElementType`].
pub trait Element: Copy + Send + Sync + 'static {
    /// [`ElementType`] tag for this scalar.
    const ELEMENT_TYPE: ElementType;
    /// Byte width of one encoded value.
    const WIDTH: usize;

    /// Decode a value from the first `WIDTH` bytes of `bytes`.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than `WIDTH`.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode the value into the first `WIDTH` bytes of `out`.
    ///
    /// # Panics
    /// Panics if `out` is shorter than `WIDTH`.
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
                <$ty>::from_le_bytes(raw)
            }

            fn write_le(self, out: &mut [u8]) {
                out[..std::mem::size_of::<$ty>()].copy_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_element!(i8, Int8);
impl_element!(u8, Uint8);
impl_element!(i16, Int16);
impl_element!(u16, Uint16);
impl_element!(i32, Int32);
impl_element!(i64, Int64);
impl_element!(f32, Float32);
impl_element!(f64, Float64);
impl_element!(f16, Float16);
impl_element!(bf16, Bfloat16);

impl Element for bool {
    const ELEMENT_TYPE: ElementType = ElementType::Bool;
    const WIDTH: usize = 1;

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn write_le(self, out: &mut [u8]) {
        out[0] = self as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_widths() {
        assert_eq!(ElementType::Bool.fixed_width(), Some(1));
        assert_eq!(ElementType::Uint8.fixed_width(), Some(1));
        assert_eq!(ElementType::Float16.fixed_width(), Some(2));
        assert_eq!(ElementType::Bfloat16.fixed_width(), Some(2));
        assert_eq!(ElementType::Int32.fixed_width(), Some(4));
        assert_eq!(ElementType::Float64.fixed_width(), Some(8));
        assert_eq!(ElementType::String.fixed_width(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ElementType::Float16.to_string(), "float16");
        assert_eq!(ElementType::Bfloat16.to_string(), "bfloat16");
        assert_eq!(ElementType::Int64.to_string(), "int64");
        assert_eq!(ElementType::String.to_string(), "string");
    }

    #[test]
    fn test_trait_widths_match_tags() {
        assert_eq!(<bool as Element>::WIDTH, 1);
        assert_eq!(<i16 as Element>::WIDTH, 2);
        assert_eq!(<f16 as Element>::WIDTH, 2);
        assert_eq!(<f64 as Element>::WIDTH, 8);
        assert_eq!(<u16 as Element>::ELEMENT_TYPE, ElementType::Uint16);
        assert_eq!(<bf16 as Element>::ELEMENT_TYPE, ElementType::Bfloat16);
    }

    #[test]
    fn test_byte_round_trip() {
        let mut raw = [0u8; 8];
        42i64.write_le(&mut raw);
        assert_eq!(i64::read_le(&raw), 42);

        (-1.5f32).write_le(&mut raw);
        assert_eq!(f32::read_le(&raw), -1.5);

        true.write_le(&mut raw);
        assert!(bool::read_le(&raw));

        f16::from_f32(2.5).write_le(&mut raw);
        assert_eq!(f16::read_le(&raw), f16::from_f32(2.5));
    }
}
