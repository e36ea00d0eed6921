//! `th-tensor` - Host tensor buffers with explicit ownership tracking.
//!
//! This crate provides:
//! - A `TensorBuffer` type over owned or caller-referenced host storage
//! - A `NativeBuffer` allocation shared zero-copy with an execution engine
//! - A closed `ElementType` enumeration with typed element codecs
//! - Dynamic nested `TensorValue`s for construction and materialization
//!
//! Narrow/widen conversions for the 16-bit float element types are mediated
//! by the `th-fp16` crate.

pub mod element;
pub mod error;
pub mod native;
pub mod shape;
pub mod tensor;
pub mod value;

// Re-export primary types at the crate root for convenience.
pub use element::{Element, ElementType};
pub use error::{Result, TensorError};
pub use native::NativeBuffer;
pub use shape::Shape;
pub use tensor::TensorBuffer;
pub use value::TensorValue;
