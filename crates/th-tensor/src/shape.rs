use std::fmt;

use crate::error::{Result, TensorError};

/// A tensor shape: an ordered sequence of non-negative dimension sizes.
///
/// Dimensions are `i64` to match the engine handoff descriptor; negative
/// values are rejected at construction, before any storage exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<i64>,
}

impl Shape {
    /// Create a shape from a slice of dimensions.
    ///
    /// # Errors
    /// Returns an error if any dimension is negative.
    pub fn new(dims: &[i64]) -> Result<Shape> {
        for (axis, &dim) in dims.iter().enumerate() {
            if dim < 0 {
                return Err(TensorError::InvalidDimension { axis, dim });
            }
        }
        Ok(Shape {
            dims: dims.to_vec(),
        })
    }

    /// The rank-0 shape of a scalar tensor.
    pub fn scalar() -> Shape {
        Shape { dims: Vec::new() }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Returns the size of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> i64 {
        self.dims[i]
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    /// Total number of elements (product of all dimension sizes).
    ///
    /// The empty product is 1, so a rank-0 scalar shape holds one element;
    /// any zero dimension yields an empty tensor.
    pub fn numel(&self) -> usize {
        self.dims.iter().product::<i64>() as usize
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}
