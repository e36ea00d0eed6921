//! `th-fp16` - Bit-exact half-precision conversion routines for tensor-host.
//!
//! This crate provides:
//! - A reference IEEE-754 binary16 decode/encode pair
//! - A bit-trick variant of the binary16 pair matching the MLAS kernels
//! - A bfloat16 decode/encode pair
//! - Bulk buffer conversion helpers
//!
//! All functions are pure and total: every 16-bit and every 32-bit input
//! pattern has a defined output. Out-of-range magnitudes saturate, sub-half
//! magnitudes round to signed zero, and NaNs canonicalize rather than error.

pub mod bfloat16;
pub mod binary16;
pub mod buffer;

pub use bfloat16::{bfloat16_to_f32, f32_to_bfloat16};
pub use binary16::{binary16_to_f32, f32_to_binary16, mlas_binary16_to_f32, mlas_f32_to_binary16};
pub use buffer::{narrow_buffer, widen_buffer, HalfEncoding};
