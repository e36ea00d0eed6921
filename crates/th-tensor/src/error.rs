use thiserror::Error;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("ragged nested array: sibling arrays at depth {depth} have lengths {expected} and {got}")]
    RaggedArray {
        depth: usize,
        expected: usize,
        got: usize,
    },
    #[error("shape mismatch: shape {dims:?} holds {expected} elements, buffer holds {got}")]
    ShapeMismatch {
        dims: Vec<i64>,
        expected: usize,
        got: usize,
    },
    #[error("invalid dimension {dim} at axis {axis}: dimensions must be non-negative")]
    InvalidDimension { axis: usize, dim: i64 },
    #[error("cannot convert {0}")]
    CannotConvert(String),
    #[error("element type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("tensor has been closed")]
    Closed,
}

impl TensorError {
    /// True for shape-class failures: ragged input, shape/buffer size
    /// mismatch, malformed dimension.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            TensorError::RaggedArray { .. }
                | TensorError::ShapeMismatch { .. }
                | TensorError::InvalidDimension { .. }
        )
    }

    /// True for type-class failures: unconvertible input, element-type or
    /// buffer-type mismatch.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            TensorError::CannotConvert(_) | TensorError::TypeMismatch { .. }
        )
    }

    /// True for lifecycle failures: use after close.
    pub fn is_state_error(&self) -> bool {
        matches!(self, TensorError::Closed)
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;
